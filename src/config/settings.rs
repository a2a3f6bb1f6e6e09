//! Configuration settings for the assistant.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub fetch: FetchSettings,
    pub convert: ConvertSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub catalog: CatalogSettings,
    pub agent: AgentSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level without `-v` (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.mpcs-assistant".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Page fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Skip TLS certificate verification when fetching pages.
    pub accept_invalid_certs: bool,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Delay between consecutive fetches while building an index.
    pub request_delay_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            timeout_seconds: 60,
            user_agent: concat!("mpcs-assistant/", env!("CARGO_PKG_VERSION")).to_string(),
            request_delay_ms: 3000,
        }
    }
}

/// HTML to markdown conversion settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// Drop every attribute except `a[href]` and `img[src]` before converting.
    pub strip_attributes: bool,
    /// Collapse blank lines and whitespace runs in the markdown output.
    pub minify: bool,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            strip_attributes: true,
            minify: true,
        }
    }
}

/// Text chunking settings, measured in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Similarity index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Directory holding one `<collection>_index` directory per collection.
    pub root_dir: String,
    /// Directory holding the `<collection>.txt` URL lists.
    pub urls_dir: String,
    /// Number of chunks returned by the search tools.
    pub top_k: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            root_dir: "~/.mpcs-assistant/vectorstore".to_string(),
            urls_dir: "web_urls".to_string(),
            top_k: 3,
        }
    }
}

/// Course catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Base URL of the course catalog site.
    pub base_url: String,
    /// Year used when a tool call does not name one.
    pub default_year: u16,
    /// Latest academic year with a published whole-year catalog page.
    pub latest_catalog_year: u16,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://mpcs-courses.cs.uchicago.edu".to_string(),
            default_year: 2024,
            latest_catalog_year: 2023,
        }
    }
}

/// Agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model driving the tool-calling loop.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum model calls per question.
    pub max_iterations: usize,
    /// Approximate token budget for verbatim conversation history.
    pub memory_max_tokens: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_iterations: 15,
            memory_max_tokens: 2000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::AssistantError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mpcs-assistant")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded index root directory.
    pub fn index_root(&self) -> PathBuf {
        Self::expand_path(&self.index.root_dir)
    }

    /// Get the expanded URL list directory.
    pub fn urls_dir(&self) -> PathBuf {
        Self::expand_path(&self.index.urls_dir)
    }
}
