//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{AssistantError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering questions calls the chat and embeddings APIs.
    Ask,
    /// Building or searching an index calls the embeddings API.
    Index,
    /// Catalog lookups and page conversion only fetch pages.
    Browse,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Index => {
            check_api_key()?;
            check_url_lists(settings)?;
        }
        Operation::Browse => {}
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(AssistantError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(AssistantError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// An index can be loaded without its URL list, so only the directory is checked.
fn check_url_lists(settings: &Settings) -> Result<()> {
    let urls_dir = settings.urls_dir();
    if urls_dir.is_dir() || settings.index_root().is_dir() {
        Ok(())
    } else {
        Err(AssistantError::Config(format!(
            "Neither the URL list directory {} nor the index directory {} exists",
            urls_dir.display(),
            settings.index_root().display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_browse_no_requirements() {
        assert!(check(Operation::Browse, &Settings::default()).is_ok());
    }

    #[test]
    fn test_check_url_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.index.root_dir = dir.path().join("missing").to_string_lossy().to_string();
        settings.index.urls_dir = dir.path().join("also-missing").to_string_lossy().to_string();
        assert!(check_url_lists(&settings).is_err());

        settings.index.urls_dir = dir.path().to_string_lossy().to_string();
        assert!(check_url_lists(&settings).is_ok());
    }
}
