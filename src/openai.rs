//! HTTP client construction for OpenAI and page fetching.

use crate::config::FetchSettings;
use crate::error::{AssistantError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;
use tracing::warn;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with the default timeout.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AssistantError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// Create the HTTP client used to fetch catalog and program pages.
///
/// Certificate verification follows `fetch.accept_invalid_certs`; the course
/// site has historically served an incomplete chain, so it defaults to off.
pub fn create_page_client(settings: &FetchSettings) -> Result<reqwest::Client> {
    if settings.accept_invalid_certs {
        warn!("TLS certificate verification is disabled for page fetches");
    }

    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .user_agent(settings.user_agent.clone())
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .build()
        .map_err(|e| AssistantError::Config(format!("Failed to create HTTP client: {}", e)))
}
