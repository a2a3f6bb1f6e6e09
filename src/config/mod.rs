//! Configuration module.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, MemoryPrompts, Prompts};
pub use settings::{
    AgentSettings, CatalogSettings, ChunkingSettings, ConvertSettings, EmbeddingSettings,
    FetchSettings, GeneralSettings, IndexSettings, PromptSettings, Settings,
};
