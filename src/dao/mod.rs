/// Catalog API accessor and its record types.
pub mod catalog;
/// Shared document model definitions.
pub mod models;
/// Storage abstraction layer for remote document operations.
pub mod storage;
/// Per-user document store backends (profile and bookmarks).
pub mod user_store;
