//! Prompt templates for the assistant.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"))
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub memory: MemoryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the tool-calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful and talkative course planner for MPCS students. Any answer should have the source link url.
If you can't find the answer to a question, you truthfully say you don't know.

Tools:
- 'list_courses' lists the courses offered in a year, or in one quarter of it
- 'course_detail' returns the catalog page of one course section
- 'search_internal_info' searches pages for enrolled students (registration, requirements, policies)
- 'search_external_info' searches public program pages (admissions, programs, faculty, careers)

The answer should be in markdown and use this format:
<answer-text>
Sources: <source-url-1>, <source-url-2>, ..."#
                .to_string(),
        }
    }
}

/// Prompts for progressive conversation summarisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryPrompts {
    pub summarize: String,
}

impl Default for MemoryPrompts {
    fn default() -> Self {
        Self {
            summarize: r#"Progressively summarize the lines of conversation provided, adding onto the previous summary and returning a new summary.
Keep course codes, quarters, instructors and source URLs that were mentioned.

Current summary:
{{summary}}

New lines of conversation:
{{new_lines}}

New summary:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            let memory_path = custom_path.join("memory.toml");
            if memory_path.exists() {
                let content = std::fs::read_to_string(&memory_path)?;
                prompts.memory = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are replaced in one pass, so substituted text is never
    /// expanded again. Unknown placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        placeholder()
            .replace_all(template, |caps: &regex::Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// The agent system prompt with custom variables applied.
    pub fn agent_system(&self) -> String {
        Self::render(&self.agent.system, &self.variables)
    }
}
