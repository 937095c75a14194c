//! Vector store access for ragscope
//!
//! The evaluation core treats the vector store as an external collaborator
//! reached through a single capability, [`VectorStore::search`]. This crate
//! defines that trait and ships three backends: a scripted mock for tests,
//! a fixture store replaying recorded search results, and an HTTP client for
//! a remote search service.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod error;
mod factory;
mod fixture;
mod http;
mod mock;

pub use error::StorageError;
pub use factory::create_vector_store;
pub use fixture::{FixtureVectorStore, RecordedQuery, RecordedResults};
pub use http::HttpVectorStore;
pub use mock::{MockVectorStore, MockVectorStoreBuilder};

use async_trait::async_trait;
use ragscope_core::{Error, SearchHit};

// ==== Traits ====

/// Similarity search over an indexed corpus
///
/// Implementations return at most `k` hits ordered by ascending distance and
/// must be safe for concurrent read-only queries.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Search for the `k` chunks nearest to the query text
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, Error>;

    /// Short backend name used in logs
    fn name(&self) -> &str;
}
