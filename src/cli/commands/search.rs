//! Search command implementation.

use super::{check_ready, orchestrator_with_progress};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Collection;
use crate::tools::search_index;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(collection: Collection, query: &str, k: Option<usize>, settings: Settings) -> Result<()> {
    check_ready(Operation::Index, &settings)?;

    let (orchestrator, bar) = orchestrator_with_progress(&settings)?;
    let index = orchestrator.get_or_build(collection, false).await;
    bar.finish_and_clear();
    let index = index?;

    let spinner = Output::spinner("Searching...");
    let embedder = orchestrator.embedder();
    let results = search_index(&index, embedder.as_ref(), query, k.unwrap_or(settings.index.top_k)).await;
    spinner.finish_and_clear();
    let results = results?;

    if results.is_empty() {
        Output::warning(&format!("The {} index is empty.", collection));
        return Ok(());
    }

    Output::header(&format!("Top {} {} results", results.len(), collection));
    for (i, result) in results.iter().enumerate() {
        Output::search_result(i + 1, &result.document.metadata.source, result.score, &result.document.content);
    }

    Ok(())
}
