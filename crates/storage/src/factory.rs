use crate::{FixtureVectorStore, HttpVectorStore, MockVectorStore, VectorStore};
use ragscope_core::{config::StorageConfig, Error};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Creates a vector store based on configuration.
///
/// This is the primary factory function for creating stores. It returns a
/// trait object so the retrieval layer never depends on a concrete backend.
///
/// # Errors
/// Returns an error if the provider is unknown, a required setting is missing,
/// or the backend cannot be constructed (unreadable fixture, bad HTTP client).
///
/// # Example
/// ```ignore
/// let mut config = StorageConfig::default();
/// config.fixture_path = Some("recorded.json".to_string());
/// let store = create_vector_store(&config).await?;
/// ```
pub async fn create_vector_store(config: &StorageConfig) -> Result<Arc<dyn VectorStore>, Error> {
    match config.provider.as_str() {
        "fixture" => {
            let path = config.fixture_path.as_deref().ok_or_else(|| {
                Error::config("storage.fixture_path is required for the fixture provider")
            })?;
            let store = FixtureVectorStore::from_file(Path::new(path)).await?;
            Ok(Arc::new(store) as Arc<dyn VectorStore>)
        }
        "http" => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                Error::config("storage.base_url is required for the http provider")
            })?;
            let store = HttpVectorStore::new(
                base_url,
                config.collection.clone(),
                config.api_key.clone(),
                config.timeout_secs,
            )?;
            Ok(Arc::new(store) as Arc<dyn VectorStore>)
        }
        "mock" => {
            info!("Using empty mock vector store");
            Ok(Arc::new(MockVectorStore::new()) as Arc<dyn VectorStore>)
        }
        other => Err(Error::config(format!(
            "Unknown storage provider: '{other}'. Valid providers: fixture, http, mock"
        ))),
    }
}
