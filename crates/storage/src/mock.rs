// Scripted in-memory store for tests
use crate::error::StorageError;
use crate::VectorStore;
use async_trait::async_trait;
use ragscope_core::{Error, SearchHit};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory vector store returning scripted hits per query
///
/// Unknown queries fall back to the default hit list. Every call is recorded
/// so tests can assert how many items each retrieval stage requested.
#[derive(Default)]
pub struct MockVectorStore {
    responses: HashMap<String, Vec<SearchHit>>,
    default_hits: Vec<SearchHit>,
    failing_queries: HashSet<String>,
    calls: Mutex<Vec<(String, usize)>>,
}

/// Builder for MockVectorStore
#[derive(Default)]
pub struct MockVectorStoreBuilder {
    responses: HashMap<String, Vec<SearchHit>>,
    default_hits: Vec<SearchHit>,
    failing_queries: HashSet<String>,
}

impl MockVectorStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits returned for an exact query string
    pub fn with_hits(mut self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.responses.insert(query.into(), hits);
        self
    }

    /// Hits returned for any query without scripted hits
    pub fn with_default_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.default_hits = hits;
        self
    }

    /// Make searches for this query fail as if the store were unreachable
    pub fn failing_on(mut self, query: impl Into<String>) -> Self {
        self.failing_queries.insert(query.into());
        self
    }

    pub fn build(self) -> MockVectorStore {
        MockVectorStore {
            responses: self.responses,
            default_hits: self.default_hits,
            failing_queries: self.failing_queries,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockVectorStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        MockVectorStoreBuilder::new().build()
    }

    pub fn builder() -> MockVectorStoreBuilder {
        MockVectorStoreBuilder::new()
    }

    /// `(query, k)` pairs in call order
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, Error> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((query.to_string(), k));

        if self.failing_queries.contains(query) {
            return Err(StorageError::Unavailable(format!("mock failure for '{query}'")).into());
        }

        let hits = self.responses.get(query).unwrap_or(&self.default_hits);
        Ok(hits.iter().take(k).cloned().collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hit(source: &str, distance: f64) -> SearchHit {
        SearchHit {
            text: String::new(),
            source: source.to_string(),
            chunk_index: 0,
            distance,
        }
    }

    #[tokio::test]
    async fn test_scripted_hits_truncated_to_k() {
        let store = MockVectorStore::builder()
            .with_hits("q", vec![hit("a", 0.1), hit("b", 0.2), hit("c", 0.3)])
            .build();

        let hits = store.search("q", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, "a");
        assert_eq!(store.calls(), vec![("q".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_unknown_query_uses_default_hits() {
        let store = MockVectorStore::builder()
            .with_default_hits(vec![hit("z", 0.5)])
            .build();
        let hits = store.search("anything", 10).await.unwrap();
        assert_eq!(hits, vec![hit("z", 0.5)]);
    }

    #[tokio::test]
    async fn test_failing_query_returns_storage_error() {
        let store = MockVectorStore::builder().failing_on("boom").build();
        let err = store.search("boom", 3).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_k_still_records_call() {
        let store = MockVectorStore::builder()
            .with_default_hits(vec![hit("a", 0.1)])
            .build();
        let hits = store.search("q", 0).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(store.calls(), vec![("q".to_string(), 0)]);
    }
}
