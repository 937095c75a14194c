//! HTTP client for a remote search service

use crate::error::StorageError;
use crate::VectorStore;
use async_trait::async_trait;
use ragscope_core::{Error, SearchHit};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Request payload for `POST {base_url}/search`
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    collection: &'a str,
    query: &'a str,
    k: usize,
}

/// Response from the search service
#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

impl SearchResponse {
    /// Leading `k` hits; services may return more than requested
    fn into_top(self, k: usize) -> Vec<SearchHit> {
        let mut hits = self.hits;
        hits.truncate(k);
        hits
    }
}

/// Vector store reached over HTTP
///
/// The service embeds the query itself and returns hits ordered by
/// ascending distance.
pub struct HttpVectorStore {
    client: Client,
    search_url: String,
    collection: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl HttpVectorStore {
    /// Create a new HTTP vector store client
    ///
    /// # Arguments
    /// * `base_url` - Service root, `/search` is appended
    /// * `collection` - Collection to query
    /// * `api_key` - Optional bearer token
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(
        base_url: &str,
        collection: String,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, Error> {
        info!("Initializing HTTP vector store");
        info!("  Base URL: {base_url}");
        info!("  Collection: {collection}");
        info!("  Timeout: {timeout_secs}s");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StorageError::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_url: format!("{}/search", base_url.trim_end_matches('/')),
            collection,
            api_key,
            timeout_secs,
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, Error> {
        let request = SearchRequest {
            collection: &self.collection,
            query,
            k,
        };

        let mut builder = self.client.post(&self.search_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                StorageError::Timeout(self.timeout_secs)
            } else {
                StorageError::ConnectionFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::RequestFailed { status, body }.into());
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        debug!("HTTP search '{query}' returned {} hits", body.hits.len());
        Ok(body.into_top(k))
    }

    fn name(&self) -> &str {
        "http"
    }
}
