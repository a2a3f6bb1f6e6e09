//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod convert;
mod courses;
mod index;
mod search;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use convert::run_convert;
pub use courses::{run_course, run_courses};
pub use index::run_index;
pub use search::run_search;

use crate::assistant::Assistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;

/// Run pre-flight checks, printing what is missing.
fn check_ready(operation: Operation, settings: &Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(operation, settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }
    Ok(())
}

/// Orchestrator reporting page fetches on a progress bar.
fn orchestrator_with_progress(settings: &Settings) -> anyhow::Result<(Orchestrator, indicatif::ProgressBar)> {
    let bar = Output::progress_bar(0, "Preparing indexes");
    let orchestrator = Orchestrator::new(settings)?.with_progress(bar.clone());
    Ok((orchestrator, bar))
}

/// Get or build both indexes and assemble the assistant.
async fn load_assistant(settings: &Settings, rebuild: bool) -> anyhow::Result<Assistant> {
    let (orchestrator, bar) = orchestrator_with_progress(settings)?;
    let assistant = Assistant::initialize(settings, &orchestrator, rebuild).await;
    bar.finish_and_clear();
    Ok(assistant?)
}
