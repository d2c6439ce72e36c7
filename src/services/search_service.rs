//! Debounced, cached game search.
//!
//! Every settled term is its own cache key, so flipping back to a recent term
//! is served from the cache; the debouncer keeps per-keystroke edits from
//! each becoming a network fetch.

use std::sync::Arc;

use crate::{
    cache::{Debouncer, QueryCache, QueryKey, QueryOptions, QueryResult},
    config::CacheConfig,
    dao::catalog::{CatalogClient, GameRecord},
    error::QueryError,
};

/// Cache namespace search results live under.
const SEARCH_NAMESPACE: &str = "search";

/// Search reads composed with the cache and a keystroke debouncer.
pub struct SearchService {
    client: Arc<CatalogClient>,
    cache: Arc<QueryCache>,
    debouncer: Debouncer,
}

impl SearchService {
    /// Build a service over a catalog client and a query cache.
    pub fn new(client: Arc<CatalogClient>, cache: Arc<QueryCache>, config: &CacheConfig) -> Self {
        Self {
            client,
            cache,
            debouncer: Debouncer::new(config.search_debounce()),
        }
    }

    /// Cache key the results for `term` live under.
    pub fn search_key(term: &str) -> QueryKey {
        QueryKey::new(SEARCH_NAMESPACE, [term])
    }

    /// Search immediately, ranked as the catalog returns them.
    ///
    /// An empty term resolves to an empty list without touching the network
    /// or the cache.
    pub async fn search(&self, term: &str) -> QueryResult<Vec<GameRecord>> {
        let term = term.trim();
        if term.is_empty() {
            return QueryResult::ready(Vec::new());
        }
        let client = Arc::clone(&self.client);
        let owned = term.to_string();
        self.cache
            .query(
                Self::search_key(term),
                move || async move { client.search_games(&owned).await.map_err(QueryError::from) },
                QueryOptions::default(),
            )
            .await
    }

    /// Debounced entry point for per-keystroke term edits.
    ///
    /// Waits out the quiescence window and yields `None` when a newer edit
    /// superseded this one.
    pub async fn search_debounced(&self, term: &str) -> Option<QueryResult<Vec<GameRecord>>> {
        let settled = self.debouncer.settle(term.trim().to_string()).await?;
        Some(self.search(&settled).await)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dao::catalog::CatalogConfig;

    fn unroutable_service() -> Arc<SearchService> {
        // Any request actually sent in these tests would error out.
        let client = CatalogClient::new(
            CatalogConfig::new("test-key").with_base_url("http://127.0.0.1:9/api"),
        )
        .unwrap();
        Arc::new(SearchService::new(
            Arc::new(client),
            Arc::new(QueryCache::default()),
            &CacheConfig::default().with_search_debounce(Duration::from_millis(20)),
        ))
    }

    #[tokio::test]
    async fn empty_term_resolves_without_the_network() {
        let service = unroutable_service();

        let result = service.search("").await;
        assert!(result.is_success());
        assert!(result.data().unwrap().is_empty());

        let result = service.search("   ").await;
        assert!(result.is_success());
        assert!(result.data().unwrap().is_empty());
    }

    #[tokio::test]
    async fn superseded_edit_yields_none() {
        let service = unroutable_service();

        let stale = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.search_debounced("").await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        let settled = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.search_debounced("").await }
        });

        assert!(stale.await.unwrap().is_none());
        // The surviving edit settles; with an empty term it resolves locally.
        let result = settled.await.unwrap().unwrap();
        assert!(result.is_success());
    }
}
