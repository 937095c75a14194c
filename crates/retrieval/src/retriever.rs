use crate::stages::{self, DEFAULT_OVERFETCH_FACTOR};
use async_trait::async_trait;
use ragscope_core::{Error, RankedResultList};
use ragscope_storage::VectorStore;
use std::sync::Arc;
use tracing::debug;

/// Produce a ranked result list for a query
///
/// Implemented by the store-backed base retriever and by every stage that
/// wraps another retriever.
#[async_trait]
pub trait Retrieve: Send + Sync {
    /// Retrieve at most `k` items for `query`, in rank order
    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedResultList, Error>;
}

// ==== Base retriever ====

/// Plain similarity search: exactly one store call with the requested `k`
#[derive(Clone)]
pub struct StoreRetriever {
    store: Arc<dyn VectorStore>,
}

impl StoreRetriever {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Retrieve for StoreRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedResultList, Error> {
        let hits = self.store.search(query, k).await?;
        debug!(
            "{} store returned {} hits for k={k}",
            self.store.name(),
            hits.len()
        );
        Ok(RankedResultList::from_hits(hits))
    }
}

// ==== Stages ====

/// Source-level deduplication over an inner retriever
///
/// Requests `factor * k` items so that enough distinct sources survive,
/// then keeps the first chunk of each source up to `k`.
pub struct Deduplicate {
    inner: Arc<dyn Retrieve>,
    overfetch_factor: usize,
}

impl Deduplicate {
    pub fn new(inner: Arc<dyn Retrieve>) -> Self {
        Self::with_overfetch_factor(inner, DEFAULT_OVERFETCH_FACTOR)
    }

    /// A factor of 0 is treated as 1
    pub fn with_overfetch_factor(inner: Arc<dyn Retrieve>, overfetch_factor: usize) -> Self {
        Self {
            inner,
            overfetch_factor: overfetch_factor.max(1),
        }
    }
}

#[async_trait]
impl Retrieve for Deduplicate {
    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedResultList, Error> {
        let fetch_k = stages::overfetch(k, self.overfetch_factor);
        let fetched = self.inner.retrieve(query, fetch_k).await?;
        let fetched_len = fetched.len();
        let deduped = stages::dedup_by_source(fetched, k);
        debug!(
            "Deduplicated {fetched_len} items (fetched k={fetch_k}) to {} unique sources",
            deduped.len()
        );
        Ok(deduped)
    }
}

/// Similarity floor plus optional result cap over an inner retriever
pub struct SimilarityThreshold {
    inner: Arc<dyn Retrieve>,
    min_similarity: f64,
    max_results: Option<usize>,
}

impl SimilarityThreshold {
    pub fn new(inner: Arc<dyn Retrieve>, min_similarity: f64, max_results: Option<usize>) -> Self {
        Self {
            inner,
            min_similarity,
            max_results,
        }
    }
}

#[async_trait]
impl Retrieve for SimilarityThreshold {
    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedResultList, Error> {
        let results = self.inner.retrieve(query, k).await?;
        let before = results.len();
        let filtered = stages::filter_by_similarity(results, self.min_similarity);
        let limited = stages::limit(filtered, self.max_results);
        debug!(
            "Similarity threshold {:.3} kept {} of {before} items",
            self.min_similarity,
            limited.len()
        );
        Ok(limited)
    }
}

// ==== Facade ====

/// Entry point for the three retrieval variants over one store
///
/// ```ignore
/// let retriever = Retriever::new(store);
/// let top = retriever.retrieve("attention heads", 5).await?;
/// let unique = retriever.retrieve_deduplicated("attention heads", 5).await?;
/// let ranked = retriever.retrieve_ranked("attention heads", 10, 0.3, Some(5)).await?;
/// ```
#[derive(Clone)]
pub struct Retriever {
    base: Arc<dyn Retrieve>,
    overfetch_factor: usize,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            base: Arc::new(StoreRetriever::new(store)),
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
        }
    }

    pub fn with_overfetch_factor(mut self, factor: usize) -> Self {
        self.overfetch_factor = factor.max(1);
        self
    }

    /// Top-`k` chunks in store order
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RankedResultList, Error> {
        self.base.retrieve(query, k).await
    }

    /// Up to `k` chunks from distinct sources
    pub async fn retrieve_deduplicated(
        &self,
        query: &str,
        k: usize,
    ) -> Result<RankedResultList, Error> {
        Deduplicate::with_overfetch_factor(self.base.clone(), self.overfetch_factor)
            .retrieve(query, k)
            .await
    }

    /// Top-`k` chunks with similarity at least `min_similarity`, capped at
    /// `max_results`
    ///
    /// The threshold is skipped when `min_similarity` is not positive.
    pub async fn retrieve_ranked(
        &self,
        query: &str,
        k: usize,
        min_similarity: f64,
        max_results: Option<usize>,
    ) -> Result<RankedResultList, Error> {
        SimilarityThreshold::new(self.base.clone(), min_similarity, max_results)
            .retrieve(query, k)
            .await
    }
}

#[async_trait]
impl Retrieve for Retriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedResultList, Error> {
        self.base.retrieve(query, k).await
    }
}
