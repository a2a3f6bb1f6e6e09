//! URL lists backing each collection.
//!
//! A list is a plain text file named `<collection>.txt`, one URL per line.

use crate::error::{AssistantError, Result};
use std::path::Path;
use tracing::debug;

/// Read the URL list for `name` from `urls_dir`.
///
/// Lines are trimmed; blank lines and `#` comments are skipped so they never
/// turn into fetches.
pub fn load_urls(urls_dir: &Path, name: &str) -> Result<Vec<String>> {
    let path = urls_dir.join(format!("{}.txt", name));

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AssistantError::UrlListNotFound(path));
        }
        Err(e) => return Err(e.into()),
    };

    let mut urls = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            debug!("Skipping line {} of {}", number + 1, path.display());
            continue;
        }
        urls.push(line.to_string());
    }

    debug!("Loaded {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}
