//! Failure taxonomy reported to the presentation layer.

use std::{error::Error, sync::Arc};

use thiserror::Error;

use crate::dao::{catalog::CatalogError, storage::StorageError};

/// Category of a failure surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A read against a remote API failed (transport error or non-success status).
    RemoteFetchFailed,
    /// A remote mutation was rejected or failed in transport.
    RemoteWriteFailed,
    /// The identity provider subscription reported an error.
    AuthStateFailed,
    /// Creating the first-sign-in profile document failed. Non-fatal.
    ProfileCreationFailed,
}

/// Failure record captured into cache entries and session state.
///
/// Every observer of a key receives the same resolution, so the rendered
/// message is reference-counted and the whole record is cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct QueryError {
    kind: ErrorKind,
    message: Arc<str>,
}

impl QueryError {
    /// Build an error record from a kind and a rendered message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Arc::from(message.into()),
        }
    }

    /// Category this failure belongs to.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable description, including the source chain.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CatalogError> for QueryError {
    fn from(err: CatalogError) -> Self {
        QueryError::new(ErrorKind::RemoteFetchFailed, render_chain(&err))
    }
}

impl From<StorageError> for QueryError {
    fn from(err: StorageError) -> Self {
        let kind = match &err {
            StorageError::ReadFailed { .. } => ErrorKind::RemoteFetchFailed,
            StorageError::WriteFailed { .. } => ErrorKind::RemoteWriteFailed,
        };
        QueryError::new(kind, render_chain(&err))
    }
}

/// Flatten an error and its source chain into one message.
pub(crate) fn render_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_read_and_write_map_to_distinct_kinds() {
        let read = StorageError::read(
            "listing bookmarks".into(),
            std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"),
        );
        let write = StorageError::write(
            "inserting bookmark".into(),
            std::io::Error::new(std::io::ErrorKind::Other, "rejected"),
        );

        assert_eq!(QueryError::from(read).kind(), ErrorKind::RemoteFetchFailed);
        assert_eq!(QueryError::from(write).kind(), ErrorKind::RemoteWriteFailed);
    }

    #[test]
    fn message_includes_source_chain() {
        let err = StorageError::read(
            "listing bookmarks".into(),
            std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"),
        );
        let query_err = QueryError::from(err);
        assert!(query_err.message().contains("listing bookmarks"));
        assert!(query_err.message().contains("timed out"));
    }
}
