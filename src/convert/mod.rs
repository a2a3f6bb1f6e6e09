//! Web page to markdown conversion.
//!
//! Every converted page ends with a `Source Link URL : <url>` line so tool
//! output cites itself.

mod html;

pub use html::{minify, strip_attributes, to_markdown};

use crate::config::{ConvertSettings, FetchSettings};
use crate::error::{AssistantError, Result};
use crate::openai::create_page_client;
use crate::vector_store::Document;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

/// Label of the citation footer appended to every converted page.
pub const SOURCE_FOOTER_LABEL: &str = "Source Link URL :";

/// Source of raw HTML for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP(S).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher from fetch settings.
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        Ok(Self {
            client: create_page_client(settings)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|e| AssistantError::Fetch {
            url: url.to_string(),
            reason: format!("invalid URL: {}", e),
        })?;

        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Converts web pages to cleaned markdown.
#[derive(Clone)]
pub struct MarkdownConverter {
    fetcher: Arc<dyn PageFetcher>,
    options: ConvertSettings,
}

impl MarkdownConverter {
    /// Create a converter with the default options (strip attributes, minify).
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_options(fetcher, ConvertSettings::default())
    }

    /// Create a converter with custom options.
    pub fn with_options(fetcher: Arc<dyn PageFetcher>, options: ConvertSettings) -> Self {
        Self { fetcher, options }
    }

    /// Fetch `url` and return it as markdown followed by the citation footer.
    pub async fn convert(&self, url: &str) -> Result<String> {
        info!("URL: {}", url);
        let html = self.fetcher.fetch(url).await?;
        let markdown = self.convert_html(&html)?;

        let ratio = if html.is_empty() {
            0.0
        } else {
            markdown.len() as f64 * 100.0 / html.len() as f64
        };
        info!("Compression: {}/{} ({:.2}%)", markdown.len(), html.len(), ratio);

        Ok(format!("{}\n\n{} {}", markdown, SOURCE_FOOTER_LABEL, url))
    }

    /// Fetch `url` as a single document whose source is the URL.
    pub async fn load_document(&self, url: &str) -> Result<Document> {
        let content = self.convert(url).await?;
        Ok(Document::new(content, url))
    }

    fn convert_html(&self, html: &str) -> Result<String> {
        let markdown = if self.options.strip_attributes {
            to_markdown(&strip_attributes(html))?
        } else {
            to_markdown(html)?
        };

        Ok(if self.options.minify {
            minify(&markdown)
        } else {
            markdown
        })
    }
}
