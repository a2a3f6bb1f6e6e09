//! MPCS course assistant
//!
//! Answers questions about the MPCS program by combining live course catalog
//! lookups with similarity search over indexed program web pages.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `convert` - Web page to markdown conversion
//! - `sources` - URL lists for each collection
//! - `chunking` - Recursive character splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Similarity index and its SQLite persistence
//! - `orchestrator` - Index build and load pipeline
//! - `catalog` - Catalog terms, course codes and page URLs
//! - `tools` - Tools offered to the agent
//! - `agent` - Tool-calling loop and conversation memory
//! - `assistant` - Question answering entry point
//!
//! # Example
//!
//! ```rust,no_run
//! use mpcs_assistant::assistant::Assistant;
//! use mpcs_assistant::config::Settings;
//! use mpcs_assistant::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!     let assistant = Assistant::initialize(&settings, &orchestrator, false).await?;
//!
//!     let mut memory = assistant.new_conversation();
//!     println!("{}", assistant.chat("Who teaches cloud computing?", &mut memory).await);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod assistant;
pub mod catalog;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod convert;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod sources;
pub mod tools;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{AssistantError, Result};
