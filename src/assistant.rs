//! Question answering entry point.

use crate::agent::{Agent, AgentResponse, AskFailure, ChatModel, ConversationMemory, OpenAIChatModel};
use crate::catalog::CatalogUrls;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::orchestrator::{Collections, Orchestrator};
use crate::tools::{CourseLookup, KnowledgeSearch, ToolContext};
use std::sync::Arc;
use tracing::{info, warn};

/// Answer shown whenever the agent fails.
pub const APOLOGY: &str =
    "I'm sorry. My internal agent encountered error while processing your request.";

/// The assembled assistant: agent, tools and indexes.
pub struct Assistant {
    agent: Agent,
    memory_max_tokens: usize,
}

impl Assistant {
    pub fn new(agent: Agent, memory_max_tokens: usize) -> Self {
        Self {
            agent,
            memory_max_tokens,
        }
    }

    /// Load prompts, get or build both indexes, and assemble the agent.
    pub async fn initialize(settings: &Settings, orchestrator: &Orchestrator, force_reload: bool) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let model: Arc<dyn ChatModel> = Arc::new(OpenAIChatModel::from_settings(&settings.agent)?);

        let collections = Collections::load(orchestrator, force_reload).await?;
        info!(
            "Collections ready: {} internal chunks, {} external chunks",
            collections.internal.len(),
            collections.external.len()
        );

        Ok(Self::assemble(settings, orchestrator, collections, model, prompts))
    }

    /// Assemble an assistant from already-loaded parts.
    pub fn assemble(
        settings: &Settings,
        orchestrator: &Orchestrator,
        collections: Collections,
        model: Arc<dyn ChatModel>,
        prompts: Prompts,
    ) -> Self {
        let tools = ToolContext::new(
            CourseLookup::new(
                orchestrator.converter().clone(),
                CatalogUrls::from_settings(&settings.catalog),
            ),
            KnowledgeSearch::new(collections, orchestrator.embedder(), settings.index.top_k),
            settings.catalog.default_year,
        );
        let agent = Agent::new(model, tools, prompts).with_max_iterations(settings.agent.max_iterations);
        Self::new(agent, settings.agent.memory_max_tokens)
    }

    /// A fresh, empty conversation.
    pub fn new_conversation(&self) -> ConversationMemory {
        ConversationMemory::new(self.memory_max_tokens)
    }

    /// Ask a question, keeping the failure classification.
    pub async fn ask(
        &self,
        question: &str,
        memory: &mut ConversationMemory,
    ) -> std::result::Result<AgentResponse, AskFailure> {
        self.agent.run(question, memory).await
    }

    /// Ask a question and get an answer; any failure becomes the apology.
    pub async fn chat(&self, question: &str, memory: &mut ConversationMemory) -> String {
        answer_or_apology(self.ask(question, memory).await)
    }
}

/// The answer text, or the fixed apology after logging the failure.
pub fn answer_or_apology(result: std::result::Result<AgentResponse, AskFailure>) -> String {
    match result {
        Ok(response) => response.content,
        Err(failure) => {
            warn!("Agent failed: {}", failure);
            APOLOGY.to_string()
        }
    }
}
