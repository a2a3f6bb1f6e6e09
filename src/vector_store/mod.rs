//! Similarity index over embedded document chunks.
//!
//! An index is built wholesale from a finished set of chunks, persisted per
//! collection, and only read afterwards.

mod memory;
mod sqlite;

pub use memory::SimilarityIndex;
pub use sqlite::{IndexInfo, SqliteIndexStore, INDEX_FILE};

use serde::{Deserialize, Serialize};

/// A unit of text with the page it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Markdown content.
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source page URL.
    pub source: String,
    /// Position of this chunk within its source page, if it is a chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
}

impl Document {
    /// Create a whole-page document.
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                chunk_index: None,
            },
        }
    }

    /// Derive a chunk of this document.
    pub fn chunk(&self, content: String, index: usize) -> Self {
        Self {
            content,
            metadata: DocumentMetadata {
                source: self.metadata.source.clone(),
                chunk_index: Some(index),
            },
        }
    }
}

/// An embedded chunk stored in the index.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_chunk_inherits_source() {
        let page = Document::new("full page", "https://a.example/faq");
        let chunk = page.chunk("part".to_string(), 2);

        assert_eq!(chunk.metadata.source, "https://a.example/faq");
        assert_eq!(chunk.metadata.chunk_index, Some(2));
        assert_eq!(page.metadata.chunk_index, None);
    }
}
