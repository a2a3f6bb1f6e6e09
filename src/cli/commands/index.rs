//! Index command implementation.

use super::{check_ready, orchestrator_with_progress};
use crate::cli::preflight::Operation;
use crate::cli::{IndexTarget, Output};
use crate::config::Settings;
use anyhow::Result;

/// Build or load the selected collection indexes.
pub async fn run_index(target: IndexTarget, force: bool, settings: Settings) -> Result<()> {
    check_ready(Operation::Index, &settings)?;

    let (orchestrator, bar) = orchestrator_with_progress(&settings)?;

    for collection in target.collections() {
        bar.reset();
        bar.set_message(format!("Indexing {}", collection));
        let result = orchestrator.get_or_build(collection, force).await;
        bar.finish_and_clear();
        let index = result?;

        Output::success(&format!("{} index ready with {} chunks", collection, index.len()));
        if let Ok(info) = orchestrator.store().info(collection.as_str()) {
            Output::kv("Model", &format!("{} ({} dims)", info.model, info.dimensions));
            if let Some(built_at) = info.built_at {
                Output::kv("Built", &built_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
            }
            Output::kv(
                "Location",
                &orchestrator.store().dir_for(collection.as_str()).display().to_string(),
            );
        }
    }

    Ok(())
}
