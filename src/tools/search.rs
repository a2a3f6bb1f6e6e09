//! Similarity search over the collection indexes.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::orchestrator::{Collection, Collections};
use crate::vector_store::{SearchResult, SimilarityIndex};
use std::sync::Arc;
use tracing::debug;

/// Embeds queries and searches a collection's index.
#[derive(Clone)]
pub struct KnowledgeSearch {
    collections: Collections,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl KnowledgeSearch {
    pub fn new(collections: Collections, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            collections,
            embedder,
            top_k,
        }
    }

    /// The `k` chunks most similar to `query`, best first.
    pub async fn search(&self, collection: Collection, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let results = search_index(self.collections.get(collection), self.embedder.as_ref(), query, k).await?;
        debug!("{} search returned {} chunks", collection, results.len());
        Ok(results)
    }

    /// Search with the configured `top_k` and format the hits for the model.
    pub async fn search_formatted(&self, collection: Collection, query: &str) -> Result<String> {
        let results = self.search(collection, query, self.top_k).await?;
        Ok(format_results(&results))
    }
}

/// Embed `query` and return the `k` closest chunks of `index`.
pub async fn search_index(
    index: &SimilarityIndex,
    embedder: &dyn Embedder,
    query: &str,
    k: usize,
) -> Result<Vec<SearchResult>> {
    let embedding = embedder.embed(query).await?;
    Ok(index.search_by_vector(&embedding, k))
}

/// Render hits as numbered blocks, each citing its source page.
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No matching documents found.".to_string();
    }

    let formatted = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. Source: {} (score {:.3})\n{}",
                i + 1,
                r.document.metadata.source,
                r.score,
                r.document.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Found {} documents:\n\n{}", results.len(), formatted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::Document;

    fn toy_collections() -> Collections {
        let internal = SimilarityIndex::from_documents(
            "toy",
            2,
            vec![
                Document::new("Chunk A", "https://a.example/a"),
                Document::new("Chunk B", "https://a.example/b"),
                Document::new("Chunk C", "https://a.example/c"),
            ],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
        )
        .unwrap();
        let external = SimilarityIndex::from_documents("toy", 2, Vec::new(), Vec::new()).unwrap();

        Collections {
            internal: Arc::new(internal),
            external: Arc::new(external),
        }
    }

    struct FixedEmbedder(Vec<f32>);

    #[async_trait::async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }

        fn dimensions(&self) -> usize {
            self.0.len()
        }

        fn model(&self) -> &str {
            "toy"
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let search = KnowledgeSearch::new(toy_collections(), Arc::new(FixedEmbedder(vec![0.1, 0.9])), 3);

        let results = search.search(Collection::Internal, "anything", 3).await.unwrap();
        let order: Vec<_> = results.iter().map(|r| r.document.content.as_str()).collect();
        assert_eq!(order, vec!["Chunk B", "Chunk C", "Chunk A"]);
    }

    #[tokio::test]
    async fn test_search_formatted_cites_sources() {
        let search = KnowledgeSearch::new(toy_collections(), Arc::new(FixedEmbedder(vec![1.0, 0.0])), 2);

        let text = search.search_formatted(Collection::Internal, "anything").await.unwrap();
        assert!(text.starts_with("Found 2 documents:"));
        assert!(text.contains("1. Source: https://a.example/a"));
        assert!(!text.contains("https://a.example/b"));
    }

    #[tokio::test]
    async fn test_search_index_limits_to_k() {
        let collections = toy_collections();
        let results = search_index(&collections.internal, &FixedEmbedder(vec![1.0, 0.0]), "anything", 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.metadata.source, "https://a.example/a");
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let search = KnowledgeSearch::new(toy_collections(), Arc::new(FixedEmbedder(vec![1.0, 0.0])), 3);

        let text = search.search_formatted(Collection::External, "anything").await.unwrap();
        assert_eq!(text, "No matching documents found.");
    }
}
