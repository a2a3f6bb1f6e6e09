//! Splitting converted pages into overlapping chunks for embedding.

mod recursive;

pub use recursive::{RecursiveSplitter, DEFAULT_SEPARATORS};

use crate::config::ChunkingSettings;
use crate::error::{AssistantError, Result};
use crate::vector_store::Document;
use tracing::debug;

/// Splits documents into chunks that keep their parent's source.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    inner: RecursiveSplitter,
}

impl TextSplitter {
    /// Create a splitter; the overlap must be smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AssistantError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AssistantError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            inner: RecursiveSplitter::new(chunk_size, chunk_overlap),
        })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    /// Split each document, numbering chunks within their parent.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut chunks = Vec::new();

        for document in documents {
            let pieces = self.inner.split(&document.content);
            debug!(
                "Split {} into {} chunks",
                document.metadata.source,
                pieces.len()
            );

            chunks.extend(
                pieces
                    .into_iter()
                    .enumerate()
                    .map(|(i, content)| document.chunk(content, i)),
            );
        }

        chunks
    }
}
