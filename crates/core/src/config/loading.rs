//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::{debug, warn};

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `RAGSCOPE_` and use double underscores
    /// for nested values. For example:
    /// - `RAGSCOPE_RETRIEVAL__MIN_SIMILARITY=0.3`
    /// - `RAGSCOPE_EVALUATION__K_VALUES=1,5,10`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // Scalar defaults; k_values falls back to its serde default
        let builder = set_config_default(
            builder,
            "evaluation.max_concurrent_queries",
            default_max_concurrent_queries() as i64,
        )?;
        let builder =
            set_config_default(builder, "retrieval.deduplicate", default_deduplicate())?;
        let builder =
            set_config_default(builder, "retrieval.min_similarity", default_min_similarity())?;
        let builder = set_config_default(
            builder,
            "retrieval.dedup_overfetch_factor",
            default_dedup_overfetch_factor() as i64,
        )?;
        let builder =
            set_config_default(builder, "storage.provider", default_storage_provider())?;
        let builder = set_config_default(builder, "storage.collection", default_collection())?;
        let mut builder = set_config_default(
            builder,
            "storage.timeout_secs",
            default_timeout_secs() as i64,
        )?;

        // Add the config file if it exists
        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        } else {
            debug!("No config file at {}, using defaults", path.display());
        }

        // Add environment variables with RAGSCOPE_ prefix
        builder = builder.add_source(
            Environment::with_prefix("RAGSCOPE")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("evaluation.k_values")
                .try_parsing(true),
        );

        // Shorter variables shared with other tools talking to the same store
        if let Ok(url) = std::env::var("VECTOR_STORE_URL") {
            builder = builder
                .set_override("storage.base_url", url)
                .map_err(|e| Error::config(format!("Failed to set VECTOR_STORE_URL: {e}")))?;
        }
        if let Ok(key) = std::env::var("VECTOR_STORE_API_KEY") {
            if key.is_empty() {
                warn!("VECTOR_STORE_API_KEY is set but empty");
            }
            builder = builder
                .set_override("storage.api_key", key)
                .map_err(|e| Error::config(format!("Failed to set VECTOR_STORE_API_KEY: {e}")))?;
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.ragscope/config.toml or custom --config path)
    /// 3. Environment variables (RAGSCOPE_*, VECTOR_STORE_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
