//! REST implementation of the per-user document store.

mod config;
mod error;
mod models;
mod store;

pub use config::RestStoreConfig;
pub use error::{RestStoreError, RestStoreResult};
pub use store::RestUserStore;
