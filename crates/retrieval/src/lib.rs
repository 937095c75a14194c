//! Ranked retrieval over a vector store
//!
//! Retrieval is a single capability, [`Retrieve`], implemented by a base
//! store-backed retriever and by stages that wrap another retriever:
//!
//! - [`Deduplicate`]: over-fetch, then keep the first chunk of each source
//! - [`SimilarityThreshold`]: drop low-similarity chunks and cap the list
//!
//! [`RetrievalPipeline`] composes these from configuration, and [`Retriever`]
//! exposes the plain, deduplicated and ranked variants directly. No stage
//! ever re-sorts; store order is the ranking signal.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod pipeline;
mod retriever;
pub mod stages;

pub use pipeline::RetrievalPipeline;
pub use retriever::{Deduplicate, Retrieve, Retriever, SimilarityThreshold, StoreRetriever};
