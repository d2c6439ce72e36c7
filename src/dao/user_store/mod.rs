pub mod memory;
pub mod rest;

use futures::future::BoxFuture;

use crate::dao::{
    models::{AuthUser, BookmarkRecord, NewBookmark, UserProfile},
    storage::StorageResult,
};

/// Abstraction over the remote per-user document store holding the profile
/// document and the bookmarks subcollection.
pub trait UserStore: Send + Sync {
    /// Return the profile for the signed-in identity, creating the document on
    /// first sign-in. Idempotent: an existing profile, including its
    /// `created_at`, is returned untouched.
    fn ensure_profile(&self, user: AuthUser) -> BoxFuture<'static, StorageResult<UserProfile>>;

    /// List the bookmarks of `uid` in creation order.
    fn list_bookmarks(
        &self,
        uid: String,
    ) -> BoxFuture<'static, StorageResult<Vec<BookmarkRecord>>>;

    /// Create a bookmark document. The store assigns the document id and the
    /// creation timestamp and returns the stored record.
    fn insert_bookmark(
        &self,
        uid: String,
        bookmark: NewBookmark,
    ) -> BoxFuture<'static, StorageResult<BookmarkRecord>>;

    /// Delete a bookmark document. Deleting an id that no longer exists is a
    /// success.
    fn delete_bookmark(
        &self,
        uid: String,
        doc_id: String,
    ) -> BoxFuture<'static, StorageResult<()>>;
}
