//! Core types for the ragscope retrieval evaluation system
//!
//! This crate provides the foundational pieces shared by every other crate
//! in the workspace:
//!
//! - **Models**: retrieved chunks, ranked result lists and raw vector-store hits
//! - **Configuration**: evaluation, retrieval, storage and output settings
//! - **Error handling**: unified error type and context helpers
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod models;

// Re-export main types for convenience
pub use config::{
    Config, EvaluationConfig, OnQueryError, OutputConfig, RetrievalConfig, StorageConfig,
};
pub use error::{Error, Result, ResultExt};
pub use models::{RankedResultList, RetrievedItem, SearchHit};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::models::{RankedResultList, RetrievedItem};
}
