use std::time::Duration;

use super::error::{RestStoreError, RestStoreResult};

/// Default transport timeout applied to every document store request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Runtime configuration describing how to reach the user directory service.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    pub(super) base_url: String,
    pub(super) bearer_token: Option<String>,
    pub(super) request_timeout: Duration,
}

impl RestStoreConfig {
    /// Construct a configuration from an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Override the transport timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RestStoreResult<Self> {
        let base_url =
            std::env::var("USER_STORE_BASE_URL").map_err(|_| RestStoreError::MissingEnvVar {
                var: "USER_STORE_BASE_URL",
            })?;

        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var("USER_STORE_TOKEN") {
            config = config.with_bearer_token(token);
        }

        Ok(config)
    }
}
