use std::time::Duration;

use super::error::{CatalogError, CatalogResult};

/// Default public catalog host.
const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";
/// Default transport timeout applied to every catalog request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Runtime configuration describing how to reach the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub(super) base_url: String,
    pub(super) api_key: String,
    pub(super) request_timeout: Duration,
}

impl CatalogConfig {
    /// Construct a configuration for the default catalog host.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Point the client at a different catalog host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the transport timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> CatalogResult<Self> {
        let api_key = std::env::var("CATALOG_API_KEY").map_err(|_| CatalogError::MissingEnvVar {
            var: "CATALOG_API_KEY",
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("CATALOG_BASE_URL") {
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }
}
