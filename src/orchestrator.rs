//! Index build pipeline.
//!
//! Loads a collection's persisted index, or builds it from the collection's
//! URL list: fetch each page, split into chunks, embed, persist.

use crate::chunking::TextSplitter;
use crate::config::Settings;
use crate::convert::{HttpFetcher, MarkdownConverter, PageFetcher};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{AssistantError, Result};
use crate::sources::load_urls;
use crate::vector_store::{SimilarityIndex, SqliteIndexStore};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// A named group of pages with one backing index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Pages for enrolled students.
    Internal,
    /// Public program pages for prospective students.
    External,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Internal, Collection::External];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Internal => "internal",
            Collection::External => "external",
        }
    }
}

impl FromStr for Collection {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "internal" => Ok(Collection::Internal),
            "external" => Ok(Collection::External),
            _ => Err(AssistantError::InvalidInput(format!(
                "Unknown collection '{}'; expected internal or external",
                s
            ))),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds and loads collection indexes.
pub struct Orchestrator {
    converter: MarkdownConverter,
    embedder: Arc<dyn Embedder>,
    splitter: TextSplitter,
    store: SqliteIndexStore,
    urls_dir: PathBuf,
    request_delay: Duration,
    internal_lock: Mutex<()>,
    external_lock: Mutex<()>,
    progress: Option<ProgressBar>,
}

impl Orchestrator {
    /// Create an orchestrator with HTTP fetching and OpenAI embeddings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&settings.fetch)?);
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        Self::with_components(settings, fetcher, embedder)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: &Settings,
        fetcher: Arc<dyn PageFetcher>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        Ok(Self {
            converter: MarkdownConverter::with_options(fetcher, settings.convert),
            embedder,
            splitter: TextSplitter::from_settings(&settings.chunking)?,
            store: SqliteIndexStore::new(settings.index_root()),
            urls_dir: settings.urls_dir(),
            request_delay: Duration::from_millis(settings.fetch.request_delay_ms),
            internal_lock: Mutex::new(()),
            external_lock: Mutex::new(()),
            progress: None,
        })
    }

    /// Report per-page build progress on `bar`.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    pub fn converter(&self) -> &MarkdownConverter {
        &self.converter
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    pub fn store(&self) -> &SqliteIndexStore {
        &self.store
    }

    fn lock_for(&self, collection: Collection) -> &Mutex<()> {
        match collection {
            Collection::Internal => &self.internal_lock,
            Collection::External => &self.external_lock,
        }
    }

    /// Return the persisted index for `collection`, building it when it is
    /// missing, unreadable, or `force_reload` is set.
    ///
    /// Builds of the same collection never overlap; a caller that waited on a
    /// build loads its result instead of building again.
    #[instrument(skip(self))]
    pub async fn get_or_build(
        &self,
        collection: Collection,
        force_reload: bool,
    ) -> Result<Arc<SimilarityIndex>> {
        let _guard = self.lock_for(collection).lock().await;

        if !force_reload {
            if let Some(index) = self.try_load(collection) {
                return Ok(Arc::new(index));
            }
        }

        let index = self.build(collection).await?;
        Ok(Arc::new(index))
    }

    fn try_load(&self, collection: Collection) -> Option<SimilarityIndex> {
        let index = match self.store.load(collection.as_str()) {
            Ok(index) => index,
            Err(e) => {
                info!("No usable {} index ({}); building", collection, e);
                return None;
            }
        };

        if index.model() != self.embedder.model() || index.dimensions() != self.embedder.dimensions() {
            warn!(
                "{} index was built with {} ({} dims), now using {} ({} dims); rebuilding",
                collection,
                index.model(),
                index.dimensions(),
                self.embedder.model(),
                self.embedder.dimensions()
            );
            return None;
        }

        info!("Loaded {} index with {} chunks", collection, index.len());
        Some(index)
    }

    async fn build(&self, collection: Collection) -> Result<SimilarityIndex> {
        let urls = load_urls(&self.urls_dir, collection.as_str())?;
        info!("Building {} index from {} pages", collection, urls.len());

        if let Some(bar) = &self.progress {
            bar.set_length(urls.len() as u64);
            bar.set_position(0);
        }

        let mut documents = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            if let Some(bar) = &self.progress {
                bar.set_message(url.clone());
            }
            documents.push(self.converter.load_document(url).await?);
            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
        }

        let chunks = self.splitter.split_documents(&documents);
        debug!("Split {} pages into {} chunks", documents.len(), chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let index = SimilarityIndex::from_documents(
            self.embedder.model(),
            self.embedder.dimensions(),
            chunks,
            embeddings,
        )?;
        self.store.save(collection.as_str(), &index)?;

        info!("Built {} index with {} chunks", collection, index.len());
        Ok(index)
    }
}

/// Both collection indexes, loaded once and shared read-only.
#[derive(Clone)]
pub struct Collections {
    pub internal: Arc<SimilarityIndex>,
    pub external: Arc<SimilarityIndex>,
}

impl Collections {
    /// Get or build both indexes, internal first.
    pub async fn load(orchestrator: &Orchestrator, force_reload: bool) -> Result<Self> {
        let internal = orchestrator
            .get_or_build(Collection::Internal, force_reload)
            .await?;
        let external = orchestrator
            .get_or_build(Collection::External, force_reload)
            .await?;
        Ok(Self { internal, external })
    }

    pub fn get(&self, collection: Collection) -> &Arc<SimilarityIndex> {
        match collection {
            Collection::Internal => &self.internal,
            Collection::External => &self.external,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingFetcher, FailingEmbedder, KeywordEmbedder};

    fn settings_in(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.index.root_dir = dir.join("vectorstore").to_string_lossy().to_string();
        settings.index.urls_dir = dir.join("web_urls").to_string_lossy().to_string();
        settings.fetch.request_delay_ms = 0;
        settings
    }

    fn write_urls(dir: &std::path::Path, name: &str, urls: &[&str]) {
        let urls_dir = dir.join("web_urls");
        std::fs::create_dir_all(&urls_dir).unwrap();
        std::fs::write(urls_dir.join(format!("{}.txt", name)), urls.join("\n")).unwrap();
    }

    fn site() -> Arc<CountingFetcher> {
        Arc::new(CountingFetcher::with_pages(&[
            (
                "https://a.example/admissions",
                "<h1>Admissions</h1><p>Apply online by the January deadline.</p>",
            ),
            (
                "https://a.example/practicum",
                "<h1>Practicum</h1><p>The practicum pairs students with industry projects.</p>",
            ),
            (
                "https://a.example/faculty",
                "<h1>Faculty</h1><p>Lecturers teach the core programming sequence.</p>",
            ),
        ]))
    }

    #[tokio::test]
    async fn test_second_call_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_urls(
            dir.path(),
            "external",
            &[
                "https://a.example/admissions",
                "https://a.example/practicum",
                "https://a.example/faculty",
            ],
        );

        let fetcher = site();
        let embedder = Arc::new(KeywordEmbedder::new());

        let first = Orchestrator::with_components(&settings, fetcher.clone(), embedder.clone()).unwrap();
        let built = first.get_or_build(Collection::External, false).await.unwrap();
        assert_eq!(fetcher.count(), 3);
        assert_eq!(built.len(), 3);

        // A fresh orchestrator stands in for a new process.
        let second = Orchestrator::with_components(&settings, fetcher.clone(), embedder.clone()).unwrap();
        let loaded = second.get_or_build(Collection::External, false).await.unwrap();
        assert_eq!(fetcher.count(), 3);

        let query = embedder.embed("practicum industry").await.unwrap();
        let before = built.search_by_vector(&query, 3);
        let after = loaded.search_by_vector(&query, 3);
        assert_eq!(before.len(), 3);
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.document, b.document);
            assert_eq!(a.score, b.score);
        }
        assert_eq!(after[0].document.metadata.source, "https://a.example/practicum");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_fetches() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings_in(dir.path());
        settings.fetch.request_delay_ms = 3000;
        write_urls(
            dir.path(),
            "internal",
            &[
                "https://a.example/admissions",
                "https://a.example/practicum",
                "https://a.example/faculty",
            ],
        );

        let fetcher = site();
        let orchestrator =
            Orchestrator::with_components(&settings, fetcher.clone(), Arc::new(KeywordEmbedder::new())).unwrap();

        let started = tokio::time::Instant::now();
        orchestrator.get_or_build(Collection::Internal, false).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(fetcher.count(), 3);
        assert!(elapsed >= Duration::from_secs(6), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(9), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_force_reload_refetches() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_urls(dir.path(), "internal", &["https://a.example/practicum"]);

        let fetcher = site();
        let orchestrator =
            Orchestrator::with_components(&settings, fetcher.clone(), Arc::new(KeywordEmbedder::new())).unwrap();

        orchestrator.get_or_build(Collection::Internal, false).await.unwrap();
        orchestrator.get_or_build(Collection::Internal, false).await.unwrap();
        assert_eq!(fetcher.count(), 1);

        orchestrator.get_or_build(Collection::Internal, true).await.unwrap();
        assert_eq!(fetcher.count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_builds_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_urls(
            dir.path(),
            "external",
            &["https://a.example/admissions", "https://a.example/faculty"],
        );

        let fetcher = site();
        let orchestrator = Arc::new(
            Orchestrator::with_components(&settings, fetcher.clone(), Arc::new(KeywordEmbedder::new())).unwrap(),
        );

        let a = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.get_or_build(Collection::External, false).await })
        };
        let b = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.get_or_build(Collection::External, false).await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
        assert_eq!(fetcher.count(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_index_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_urls(dir.path(), "internal", &["https://a.example/faculty"]);

        let store = SqliteIndexStore::new(settings.index_root());
        std::fs::create_dir_all(store.dir_for("internal")).unwrap();
        std::fs::write(store.dir_for("internal").join("index.db"), b"garbage").unwrap();

        let fetcher = site();
        let orchestrator =
            Orchestrator::with_components(&settings, fetcher.clone(), Arc::new(KeywordEmbedder::new())).unwrap();

        let index = orchestrator.get_or_build(Collection::Internal, false).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(fetcher.count(), 1);
    }

    #[tokio::test]
    async fn test_failed_build_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_urls(dir.path(), "external", &["https://a.example/admissions"]);

        let orchestrator =
            Orchestrator::with_components(&settings, site(), Arc::new(FailingEmbedder)).unwrap();

        let err = orchestrator.get_or_build(Collection::External, false).await.unwrap_err();
        assert!(matches!(err, AssistantError::Embedding(_)));
        assert!(!orchestrator.store().exists("external"));
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_urls(dir.path(), "internal", &["https://a.example/missing"]);

        let orchestrator =
            Orchestrator::with_components(&settings, site(), Arc::new(KeywordEmbedder::new())).unwrap();

        let err = orchestrator.get_or_build(Collection::Internal, false).await.unwrap_err();
        assert!(matches!(err, AssistantError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_missing_url_list() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());

        let orchestrator =
            Orchestrator::with_components(&settings, site(), Arc::new(KeywordEmbedder::new())).unwrap();

        let err = orchestrator.get_or_build(Collection::Internal, false).await.unwrap_err();
        assert!(matches!(err, AssistantError::UrlListNotFound(_)));
    }

    #[test]
    fn test_collection_names() {
        assert_eq!("Internal".parse::<Collection>().unwrap(), Collection::Internal);
        assert_eq!(Collection::External.to_string(), "external");
        assert!("both".parse::<Collection>().is_err());
    }
}
