//! Agent runner with tool calling loop.

use super::memory::ConversationMemory;
use super::model::{ChatMessage, ChatModel, ToolInvocation};
use crate::config::Prompts;
use crate::error::AssistantError;
use crate::tools::{tool_definitions, ToolContext};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a question went unanswered.
#[derive(Error, Debug)]
pub enum AskFailure {
    #[error("model call failed: {0}")]
    Model(#[source] AssistantError),

    #[error("tool '{name}' failed: {source}")]
    Tool {
        name: String,
        source: AssistantError,
    },

    #[error("invalid call to tool '{name}': {source}")]
    InvalidToolCall {
        name: String,
        source: AssistantError,
    },

    #[error("no final answer after {0} model calls")]
    IterationLimit(usize),
}

/// Agent that answers questions with the MPCS tools.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolContext,
    prompts: Prompts,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent with the given model and tool context.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolContext, prompts: Prompts) -> Self {
        Self {
            model,
            tools,
            prompts,
            max_iterations: 15,
        }
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Answer `question` in the conversation held by `memory`.
    ///
    /// Any tool failure ends the run. On success the turn is added to
    /// `memory`; a failed summary of older turns is logged and kept on the
    /// response, and the answer is still returned.
    pub async fn run(
        &self,
        question: &str,
        memory: &mut ConversationMemory,
    ) -> Result<AgentResponse, AskFailure> {
        let mut messages = vec![ChatMessage::System(self.prompts.agent_system())];
        messages.extend(memory.history_messages());
        messages.push(ChatMessage::User(question.to_string()));

        let specs = tool_definitions();
        let mut tool_calls_made = Vec::new();

        for iteration in 1..=self.max_iterations {
            debug!("Agent iteration {}", iteration);

            let reply = self
                .model
                .complete(&messages, &specs)
                .await
                .map_err(AskFailure::Model)?;

            if reply.tool_calls.is_empty() {
                let content = reply.content.unwrap_or_default();
                let memory_error = match memory
                    .record(question, &content, self.model.as_ref(), &self.prompts)
                    .await
                {
                    Ok(()) => None,
                    Err(e) => {
                        warn!("Conversation summary failed, older turns kept verbatim: {}", e);
                        Some(e)
                    }
                };

                return Ok(AgentResponse {
                    content,
                    tool_calls: tool_calls_made,
                    iterations: iteration,
                    memory_error,
                });
            }

            messages.push(ChatMessage::Assistant {
                content: reply.content.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            for call in &reply.tool_calls {
                let record = self.execute_tool_call(call).await?;
                messages.push(ChatMessage::Tool {
                    call_id: call.id.clone(),
                    content: record.result.clone(),
                });
                tool_calls_made.push(record);
            }
        }

        Err(AskFailure::IterationLimit(self.max_iterations))
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, call: &ToolInvocation) -> Result<ToolCallRecord, AskFailure> {
        info!("Agent calling tool: {} with args: {}", call.name, call.arguments);

        let tool = self
            .tools
            .parse(&call.name, &call.arguments)
            .map_err(|source| AskFailure::InvalidToolCall {
                name: call.name.clone(),
                source,
            })?;

        let result = self
            .tools
            .execute(&tool)
            .await
            .map_err(|source| AskFailure::Tool {
                name: call.name.clone(),
                source,
            })?;

        Ok(ToolCallRecord {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
        })
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
    /// Set when the answer could not be folded into the conversation summary.
    pub memory_error: Option<AssistantError>,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
