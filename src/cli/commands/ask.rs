//! Ask command implementation.

use super::{check_ready, load_assistant};
use crate::assistant::answer_or_apology;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, rebuild: bool, show_tools: bool, settings: Settings) -> Result<()> {
    check_ready(Operation::Ask, &settings)?;

    let assistant = load_assistant(&settings, rebuild).await?;
    let mut memory = assistant.new_conversation();

    let spinner = Output::spinner("Thinking...");
    let result = assistant.ask(question, &mut memory).await;
    spinner.finish_and_clear();

    if show_tools {
        if let Ok(response) = &result {
            Output::header("Tool calls");
            for call in &response.tool_calls {
                Output::list_item(&call.to_string());
            }
            Output::kv("Iterations", &response.iterations.to_string());
        }
    }

    println!("\n{}\n", answer_or_apology(result));
    Ok(())
}
