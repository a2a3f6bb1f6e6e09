//! Error types for the assistant.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for assistant operations.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTML conversion failed: {0}")]
    Convert(String),

    #[error("URL list not found: {}", .0.display())]
    UrlListNotFound(PathBuf),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
