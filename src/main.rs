//! MPCS assistant CLI entry point.

use anyhow::Result;
use clap::Parser;
use mpcs_assistant::cli::{commands, Cli, Commands};
use mpcs_assistant::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("mpcs_assistant={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match cli.command {
        Commands::Ask {
            question,
            rebuild,
            show_tools,
        } => {
            commands::run_ask(&question, rebuild, show_tools, settings).await?;
        }

        Commands::Chat { rebuild } => {
            commands::run_chat(rebuild, settings).await?;
        }

        Commands::Index { target, force } => {
            commands::run_index(target, force, settings).await?;
        }

        Commands::Search { collection, query, k } => {
            commands::run_search(collection, &query, k, settings).await?;
        }

        Commands::Courses { quarter, year } => {
            commands::run_courses(quarter, year, settings).await?;
        }

        Commands::Course { code, quarter, year } => {
            commands::run_course(&code, quarter, year, settings).await?;
        }

        Commands::Convert { url } => {
            commands::run_convert(&url, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
