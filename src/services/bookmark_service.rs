//! Bookmark list maintenance with duplicate suppression and remote
//! reconciliation.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::{
    cache::{QueryCache, QueryKey, QueryOptions, QueryResult},
    dao::{
        catalog::GameRecord,
        models::{BookmarkRecord, NewBookmark},
        user_store::UserStore,
    },
    error::{ErrorKind, QueryError},
};

/// Cache namespace bookmark lists live under.
const BOOKMARKS_NAMESPACE: &str = "bookmarks";

/// Outcome of a bookmark add request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new bookmark document was created.
    Added {
        /// Identifier the store assigned to the new document.
        doc_id: String,
    },
    /// A bookmark with the same name already existed; nothing was written.
    AlreadyBookmarked,
}

/// Per-user bookmark collection: reads go through the query cache, mutations
/// write to the remote store and revalidate the cached list.
pub struct BookmarkService {
    store: Arc<dyn UserStore>,
    cache: Arc<QueryCache>,
}

impl BookmarkService {
    /// Build a service over a user document store and a query cache.
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    /// Cache key the bookmark list of `uid` lives under.
    pub fn list_key(uid: &str) -> QueryKey {
        QueryKey::new(BOOKMARKS_NAMESPACE, [uid])
    }

    /// Read the bookmark list of `uid` through the cache.
    pub async fn list(&self, uid: &str) -> QueryResult<Vec<BookmarkRecord>> {
        self.cache
            .query(
                Self::list_key(uid),
                self.list_fetch(uid),
                QueryOptions::default(),
            )
            .await
    }

    /// Bookmark `candidate` for `uid` unless one with the same name exists.
    ///
    /// Duplicate suppression is by display name, preserving the behavior of
    /// the system this replaces: two distinct catalog entries sharing a name
    /// are treated as the same bookmark. A detected duplicate is a successful
    /// no-op and performs no remote write.
    pub async fn add(&self, uid: &str, candidate: &GameRecord) -> Result<AddOutcome, QueryError> {
        let current = self.list(uid).await;
        let Some(existing) = current.data() else {
            return Err(current.error().cloned().unwrap_or_else(|| {
                QueryError::new(ErrorKind::RemoteFetchFailed, "bookmark list is unavailable")
            }));
        };

        if existing
            .iter()
            .any(|bookmark| bookmark.name == candidate.name)
        {
            debug!(uid, name = %candidate.name, "bookmark already present; skipping write");
            return Ok(AddOutcome::AlreadyBookmarked);
        }

        let record = self
            .store
            .insert_bookmark(uid.to_string(), NewBookmark::from(candidate))
            .await
            .map_err(QueryError::from)?;

        // Pick up the server-assigned document instead of guessing at it.
        self.reconcile(uid).await;
        Ok(AddOutcome::Added {
            doc_id: record.doc_id,
        })
    }

    /// Remove a bookmark document. Removing an id that no longer exists is a
    /// success.
    ///
    /// The cached list is revalidated against the remote store in both
    /// outcomes; a failed delete must not leave the list pretending the
    /// bookmark is gone.
    pub async fn remove(&self, uid: &str, doc_id: &str) -> Result<(), QueryError> {
        let outcome = self
            .store
            .delete_bookmark(uid.to_string(), doc_id.to_string())
            .await;
        self.reconcile(uid).await;
        outcome.map_err(QueryError::from)
    }

    fn list_fetch(
        &self,
        uid: &str,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<Vec<BookmarkRecord>, QueryError>> {
        let store = Arc::clone(&self.store);
        let uid = uid.to_string();
        move || Box::pin(async move { store.list_bookmarks(uid).await.map_err(QueryError::from) })
    }

    async fn reconcile(&self, uid: &str) {
        let _ = self
            .cache
            .refetch::<Vec<BookmarkRecord>, _, _>(Self::list_key(uid), self.list_fetch(uid))
            .await;
    }
}
