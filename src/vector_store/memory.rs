//! In-memory similarity index.
//!
//! Exhaustive cosine search over every entry; the collections are a few
//! hundred chunks each.

use super::{cosine_similarity, Document, IndexEntry, SearchResult};
use crate::error::{AssistantError, Result};

/// Immutable embedded-chunk index.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    model: String,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl SimilarityIndex {
    /// Build an index from embedded entries.
    ///
    /// Every embedding must have `dimensions` components.
    pub fn from_entries(
        model: impl Into<String>,
        dimensions: usize,
        entries: Vec<IndexEntry>,
    ) -> Result<Self> {
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(AssistantError::Index(format!(
                "embedding for {} has {} dimensions, expected {}",
                bad.document.metadata.source,
                bad.embedding.len(),
                dimensions
            )));
        }

        Ok(Self {
            model: model.into(),
            dimensions,
            entries,
        })
    }

    /// Pair documents with their embeddings and build an index.
    pub fn from_documents(
        model: impl Into<String>,
        dimensions: usize,
        documents: Vec<Document>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if documents.len() != embeddings.len() {
            return Err(AssistantError::Index(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }

        let entries = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| IndexEntry {
                document,
                embedding,
            })
            .collect();

        Self::from_entries(model, dimensions, entries)
    }

    /// Top `k` entries by cosine similarity to `query`, best first.
    ///
    /// Entries with equal scores keep their insertion order.
    pub fn search_by_vector(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| SearchResult {
                document: self.entries[i].document.clone(),
                score,
            })
            .collect()
    }

    /// Embedding model the index was built with.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_index() -> SimilarityIndex {
        SimilarityIndex::from_documents(
            "toy",
            3,
            vec![
                Document::new("chunk A: admissions", "https://a.example/a"),
                Document::new("chunk B: practicum", "https://a.example/b"),
                Document::new("chunk C: faculty", "https://a.example/c"),
            ],
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = toy_index();
        let results = index.search_by_vector(&[0.3, 0.9, 0.1], 3);

        assert_eq!(results.len(), 3);
        assert!(results[0].document.content.contains("chunk B"));
        assert!(results[1].document.content.contains("chunk A"));
        assert!(results[2].document.content.contains("chunk C"));
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[test]
    fn test_search_with_nan_score_keeps_order() {
        let index = SimilarityIndex::from_documents(
            "toy",
            2,
            vec![
                Document::new("broken", "https://a.example/nan"),
                Document::new("first", "https://a.example/first"),
                Document::new("second", "https://a.example/second"),
            ],
            vec![vec![f32::NAN, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]],
        )
        .unwrap();

        let results = index.search_by_vector(&[1.0, 0.0], 3);
        assert_eq!(results.len(), 3);
        let ranked: Vec<_> = results
            .iter()
            .map(|r| r.document.content.as_str())
            .filter(|c| *c != "broken")
            .collect();
        assert_eq!(ranked, vec!["first", "second"]);
    }

    #[test]
    fn test_search_truncates_without_filtering() {
        let index = toy_index();

        let results = index.search_by_vector(&[0.0, 1.0, 0.0], 2);
        assert_eq!(results.len(), 2);

        // Orthogonal hits are still returned; no score threshold.
        let results = index.search_by_vector(&[0.0, 1.0, 0.0], 10);
        assert_eq!(results.len(), 3);
        assert!(results[2].score.abs() < 0.001);
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let err = SimilarityIndex::from_documents(
            "toy",
            3,
            vec![Document::new("x", "https://a.example/x")],
            vec![vec![1.0, 0.0]],
        )
        .unwrap_err();
        assert!(matches!(err, AssistantError::Index(_)));
    }

    #[test]
    fn test_rejects_count_mismatch() {
        let err = SimilarityIndex::from_documents(
            "toy",
            2,
            vec![Document::new("x", "https://a.example/x")],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, AssistantError::Index(_)));
    }
}
