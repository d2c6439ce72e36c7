//! Thin typed accessor for the remote catalog API.
//!
//! Stateless: caching, deduplication, and retries all live in the query cache
//! upstream. Each call issues exactly one network request with the configured
//! credential injected as a query parameter.

mod config;
mod error;
mod models;

pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use models::{GameRecord, GenreRef, RatingSlice, ScreenshotRecord};

use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;

use models::{RawGame, RawScreenshot, ResultsPage};

/// HTTP client for the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl CatalogClient {
    /// Build a client from an explicit configuration.
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| CatalogError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::from(config.api_key),
        })
    }

    /// Build a client from the environment.
    pub fn from_env() -> CatalogResult<Self> {
        Self::new(CatalogConfig::from_env()?)
    }

    /// Fetch the full record for the game addressed by `slug`.
    pub async fn fetch_game(&self, slug: &str) -> CatalogResult<GameRecord> {
        if slug.is_empty() {
            return Err(CatalogError::EmptySlug);
        }
        let path = format!("games/{slug}");
        let raw: RawGame = self.get_json(&path, &[]).await?;
        Ok(raw.into())
    }

    /// Fetch the ordered screenshots for the game addressed by `slug`.
    pub async fn fetch_screenshots(&self, slug: &str) -> CatalogResult<Vec<ScreenshotRecord>> {
        if slug.is_empty() {
            return Err(CatalogError::EmptySlug);
        }
        let path = format!("games/{slug}/screenshots");
        let page: ResultsPage<RawScreenshot> = self.get_json(&path, &[]).await?;
        Ok(page.results.into_iter().map(Into::into).collect())
    }

    /// Search games by free-text term, ranked as the catalog returns them.
    ///
    /// An empty term yields an empty result without issuing a request, so
    /// per-keystroke callers do not turn every edit into network noise.
    pub async fn search_games(&self, term: &str) -> CatalogResult<Vec<GameRecord>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let page: ResultsPage<RawGame> = self.get_json("games", &[("search", term)]).await?;
        Ok(page.results.into_iter().map(Into::into).collect())
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> CatalogResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_ref())])
            .query(query)
            .send()
            .await
            .map_err(|source| CatalogError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::RequestStatus {
                path: path.to_string(),
                status,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| CatalogError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unroutable_client() -> CatalogClient {
        // Points nowhere; any test that actually sent a request would fail.
        CatalogClient::new(
            CatalogConfig::new("test-key").with_base_url("http://127.0.0.1:9/api"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn empty_search_term_skips_the_network() {
        let client = unroutable_client();
        let results = client.search_games("").await.unwrap();
        assert!(results.is_empty());

        let results = client.search_games("   ").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn empty_slug_is_rejected_before_any_request() {
        let client = unroutable_client();
        assert!(matches!(
            client.fetch_game("").await,
            Err(CatalogError::EmptySlug)
        ));
        assert!(matches!(
            client.fetch_screenshots("").await,
            Err(CatalogError::EmptySlug)
        ));
    }
}
