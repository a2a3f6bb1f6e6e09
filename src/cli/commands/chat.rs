//! Interactive chat command.

use super::{check_ready, load_assistant};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(rebuild: bool, settings: Settings) -> Result<()> {
    check_ready(Operation::Ask, &settings)?;

    let assistant = load_assistant(&settings, rebuild).await?;
    let mut memory = assistant.new_conversation();

    println!("\n{}", style("MPCS Assistant").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            memory.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let answer = assistant.chat(input, &mut memory).await;
        spinner.finish_and_clear();

        println!("\n{} {}\n", style("Assistant:").cyan().bold(), answer);
    }

    Ok(())
}
