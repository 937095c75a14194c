//! Configuration module for the ragscope system
//!
//! This module provides configuration structures and loading mechanisms.
//! Configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Storage providers accepted by `Config::validate`
pub const VALID_STORAGE_PROVIDERS: [&str; 3] = ["fixture", "http", "mock"];

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.ragscope/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".ragscope").join("config.toml"))
}

/// Main configuration structure for the ragscope system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Evaluation configuration
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Retrieval pipeline configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Vector store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Report output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// What a batch evaluation does when a single query fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnQueryError {
    /// Stop the batch and return the first error (default)
    #[default]
    Abort,
    /// Keep going and record the query as failed with zero metrics
    Record,
}

/// Configuration for metric computation over a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Cutoffs at which Precision, Recall and NDCG are reported
    #[serde(default = "default_k_values")]
    pub k_values: Vec<usize>,

    /// Batch behavior when a query's retrieval fails
    #[serde(default = "default_on_query_error")]
    pub on_query_error: OnQueryError,

    /// Number of queries evaluated concurrently (1 = sequential)
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            k_values: default_k_values(),
            on_query_error: default_on_query_error(),
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

/// Configuration for the retrieval filter chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Keep only the first chunk of each source document
    #[serde(default = "default_deduplicate")]
    pub deduplicate: bool,

    /// Drop results whose similarity is below this value (disabled at 0.0)
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    /// How many times `k` to fetch before deduplicating
    #[serde(default = "default_dedup_overfetch_factor")]
    pub dedup_overfetch_factor: usize,

    /// Optional cap applied after thresholding
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            deduplicate: default_deduplicate(),
            min_similarity: default_min_similarity(),
            dedup_overfetch_factor: default_dedup_overfetch_factor(),
            max_results: None,
        }
    }
}

/// Configuration for the vector store backend
///
/// # Providers
/// - `fixture` (default): recorded search results loaded from a JSON file
/// - `http`: remote search endpoint (`POST {base_url}/search`)
/// - `mock`: empty in-memory store for testing
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider type: "fixture", "http", "mock"
    #[serde(default = "default_storage_provider")]
    pub provider: String,

    /// Collection queried by the http provider
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Path to recorded search results (fixture only)
    #[serde(default)]
    pub fixture_path: Option<String>,

    /// Base URL of the search service (http only)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the search service (or use VECTOR_STORE_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds (http only)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            collection: default_collection(),
            fixture_path: None,
            base_url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("collection", &self.collection)
            .field("fixture_path", &self.fixture_path)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Where and how evaluation reports are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives JSON and Markdown reports
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// File name of the persisted JSON record
    #[serde(default = "default_results_file")]
    pub results_file: String,

    /// File name of the Markdown report
    #[serde(default = "default_report_file")]
    pub report_file: String,

    /// Number of retrieved sources listed per query in reports
    #[serde(default = "default_top_sources_shown")]
    pub top_sources_shown: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            results_file: default_results_file(),
            report_file: default_report_file(),
            top_sources_shown: default_top_sources_shown(),
        }
    }
}

impl OutputConfig {
    pub fn results_path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.results_file)
    }

    pub fn report_path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.report_file)
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate cutoffs
        if self.evaluation.k_values.is_empty() {
            return Err(Error::config(
                "evaluation.k_values must not be empty".to_string(),
            ));
        }
        if self.evaluation.k_values.contains(&0) {
            return Err(Error::config(
                "evaluation.k_values must all be greater than 0".to_string(),
            ));
        }

        if self.evaluation.max_concurrent_queries == 0 {
            return Err(Error::config(
                "evaluation.max_concurrent_queries must be greater than 0".to_string(),
            ));
        }
        if self.evaluation.max_concurrent_queries > 64 {
            return Err(Error::config(format!(
                "evaluation.max_concurrent_queries too large (max 64, got {})",
                self.evaluation.max_concurrent_queries
            )));
        }

        // Validate retrieval settings
        if !self.retrieval.min_similarity.is_finite() {
            return Err(Error::config(format!(
                "retrieval.min_similarity must be finite, got {}",
                self.retrieval.min_similarity
            )));
        }
        if self.retrieval.dedup_overfetch_factor == 0 {
            return Err(Error::config(
                "retrieval.dedup_overfetch_factor must be greater than 0".to_string(),
            ));
        }

        // Validate storage provider
        if !VALID_STORAGE_PROVIDERS.contains(&self.storage.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid storage provider '{}'. Must be one of: {:?}",
                self.storage.provider, VALID_STORAGE_PROVIDERS
            )));
        }
        match self.storage.provider.as_str() {
            "fixture" if self.storage.fixture_path.is_none() => {
                return Err(Error::config(
                    "storage.fixture_path is required for the fixture provider".to_string(),
                ));
            }
            "http" if self.storage.base_url.is_none() => {
                return Err(Error::config(
                    "storage.base_url is required for the http provider".to_string(),
                ));
            }
            _ => {}
        }
        if self.storage.timeout_secs == 0 {
            return Err(Error::config(
                "storage.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
