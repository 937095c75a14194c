use ragscope_core::Error as CoreError;
use thiserror::Error;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Vector store unavailable: {0}")]
    Unavailable(String),

    #[error("No recorded results for query '{0}'")]
    QueryNotRecorded(String),

    #[error("Search request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Operation timeout after {0}s")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::storage(err.to_string())
    }
}
