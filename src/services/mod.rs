/// Bookmark list maintenance with duplicate suppression.
pub mod bookmark_service;
/// Cached catalog reads and the prefetch/hydrate flow.
pub mod catalog_service;
/// Debounced, cached game search.
pub mod search_service;
/// Session tracking and first-sign-in profile materialization.
pub mod session_service;
