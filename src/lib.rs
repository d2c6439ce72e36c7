//! Client-side query cache and bookmark synchronization for a remote game
//! catalog.
//!
//! The crate is layered bottom-up: [`dao`] holds the stateless remote
//! accessors (catalog API client, per-user document store backends),
//! [`cache`] is a generic keyed cache over async fetch functions with request
//! deduplication, stale-while-revalidate, and prefetch/hydrate snapshots, and
//! [`services`] composes the two into the reads and mutations a presentation
//! layer calls: cached catalog lookups, debounced search, session tracking,
//! and a bookmark list with duplicate suppression.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use game_shelf::cache::QueryCache;
//! use game_shelf::config::CacheConfig;
//! use game_shelf::dao::catalog::{CatalogClient, CatalogError};
//! use game_shelf::services::catalog_service::CatalogService;
//!
//! # async fn run() -> Result<(), CatalogError> {
//! let cache = Arc::new(QueryCache::new(&CacheConfig::from_env()));
//! let client = Arc::new(CatalogClient::from_env()?);
//! let games = CatalogService::new(client, Arc::clone(&cache));
//!
//! let entry = games.game("portal-2").await;
//! if let Some(game) = entry.data() {
//!     println!("{} (metacritic: {:?})", game.name, game.metacritic);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod dao;
pub mod error;
pub mod services;

pub use cache::{CacheSnapshot, QueryCache, QueryKey, QueryOptions, QueryResult, QueryStatus};
pub use config::CacheConfig;
pub use error::{ErrorKind, QueryError};
