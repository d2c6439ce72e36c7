//! Error types shared by the REST document store implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`RestStoreError`] failures.
pub type RestStoreResult<T> = Result<T, RestStoreError>;

/// Failures that can occur while talking to the user directory service.
#[derive(Debug, Error)]
pub enum RestStoreError {
    /// Required environment variable is missing.
    #[error("missing user store environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build user store HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a document endpoint could not be sent or timed out.
    #[error("failed to send user store request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The service returned an unexpected status code.
    #[error("unexpected user store response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into the expected document shape.
    #[error("failed to decode user store response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}
