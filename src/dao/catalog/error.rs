//! Error types shared by the catalog API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`CatalogError`] failures.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failures that can occur while talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Required environment variable is missing.
    #[error("missing catalog environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build catalog HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A game was requested with an empty slug.
    #[error("game slug must not be empty")]
    EmptySlug,
    /// A request to a catalog endpoint could not be sent or timed out.
    #[error("failed to send catalog request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The catalog returned an unexpected status code.
    #[error("unexpected catalog response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into the expected shape.
    #[error("failed to decode catalog response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}
