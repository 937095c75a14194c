//! Recorded search results replayed as a vector store
//!
//! Lets an evaluation run offline against the exact rankings a live store
//! produced, so metric changes can be attributed to the filter chain alone.

use crate::error::StorageError;
use crate::VectorStore;
use async_trait::async_trait;
use ragscope_core::{Error, ResultExt, SearchHit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Hits recorded for a single query, in store order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedQuery {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

/// On-disk fixture format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedResults {
    /// Name of the collection the results were recorded from
    #[serde(default)]
    pub collection: Option<String>,
    pub results: Vec<RecordedQuery>,
}

/// Vector store that answers from recorded results
pub struct FixtureVectorStore {
    results: HashMap<String, Vec<SearchHit>>,
}

impl FixtureVectorStore {
    /// Build a store from recorded results; later duplicates of a query win
    pub fn new(recorded: RecordedResults) -> Self {
        let results = recorded
            .results
            .into_iter()
            .map(|r| (r.query, r.hits))
            .collect();
        Self { results }
    }

    /// Load recorded results from a JSON file
    pub async fn from_file(path: &Path) -> Result<Self, Error> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read fixture file {}", path.display()))?;
        let recorded: RecordedResults = serde_json::from_str(&content)
            .map_err(|e| StorageError::SerializationError(format!("{}: {e}", path.display())))?;

        info!(
            "Loaded {} recorded queries from {}{}",
            recorded.results.len(),
            path.display(),
            recorded
                .collection
                .as_deref()
                .map(|c| format!(" (collection: {c})"))
                .unwrap_or_default()
        );

        Ok(Self::new(recorded))
    }

    /// Number of queries with recorded results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[async_trait]
impl VectorStore for FixtureVectorStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, Error> {
        let hits = self
            .results
            .get(query)
            .ok_or_else(|| StorageError::QueryNotRecorded(query.to_string()))?;

        debug!(
            "Fixture search '{query}': {} recorded, returning up to {k}",
            hits.len()
        );
        Ok(hits.iter().take(k).cloned().collect())
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
