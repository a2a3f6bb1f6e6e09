//! Convert command implementation.

use super::check_ready;
use crate::cli::preflight::Operation;
use crate::config::Settings;
use crate::convert::{HttpFetcher, MarkdownConverter};
use anyhow::Result;
use std::sync::Arc;

/// Print a web page as cleaned markdown.
pub async fn run_convert(url: &str, settings: Settings) -> Result<()> {
    check_ready(Operation::Browse, &settings)?;

    let converter = MarkdownConverter::with_options(Arc::new(HttpFetcher::new(&settings.fetch)?), settings.convert);
    println!("{}", converter.convert(url).await?);
    Ok(())
}
