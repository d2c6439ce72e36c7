use std::error::Error;
use thiserror::Error;

/// Result alias for document store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by document store backends regardless of the underlying store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A read against the remote store failed.
    #[error("remote read failed: {message}")]
    ReadFailed {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A mutation against the remote store was rejected or failed in transport.
    #[error("remote write failed: {message}")]
    WriteFailed {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct a read failure from any backend error.
    pub fn read(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::ReadFailed {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a write failure from any backend error.
    pub fn write(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::WriteFailed {
            message,
            source: Box::new(source),
        }
    }
}
