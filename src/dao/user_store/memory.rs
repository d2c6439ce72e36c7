//! In-memory [`UserStore`] used by tests and by embedders without a remote store.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::UserStore;
use crate::dao::{
    models::{AuthUser, BookmarkRecord, NewBookmark, UserProfile},
    storage::StorageResult,
};

/// Process-local document store keeping documents in creation order.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    profiles: Arc<Mutex<IndexMap<String, UserProfile>>>,
    bookmarks: Arc<Mutex<IndexMap<String, IndexMap<String, BookmarkRecord>>>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn ensure_profile(&self, user: AuthUser) -> BoxFuture<'static, StorageResult<UserProfile>> {
        let profiles = Arc::clone(&self.profiles);
        Box::pin(async move {
            let mut profiles = profiles.lock().await;
            // Check-then-create under one lock: repeated sign-ins never
            // overwrite an existing profile's created_at.
            let profile = profiles
                .entry(user.uid.clone())
                .or_insert_with(|| UserProfile {
                    uid: user.uid.clone(),
                    email: user.email,
                    display_name: user.display_name,
                    photo_url: user.photo_url,
                    created_at: OffsetDateTime::now_utc(),
                })
                .clone();
            Ok(profile)
        })
    }

    fn list_bookmarks(
        &self,
        uid: String,
    ) -> BoxFuture<'static, StorageResult<Vec<BookmarkRecord>>> {
        let bookmarks = Arc::clone(&self.bookmarks);
        Box::pin(async move {
            let bookmarks = bookmarks.lock().await;
            Ok(bookmarks
                .get(&uid)
                .map(|records| records.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn insert_bookmark(
        &self,
        uid: String,
        bookmark: NewBookmark,
    ) -> BoxFuture<'static, StorageResult<BookmarkRecord>> {
        let bookmarks = Arc::clone(&self.bookmarks);
        Box::pin(async move {
            let record = BookmarkRecord {
                doc_id: Uuid::new_v4().to_string(),
                name: bookmark.name,
                slug: bookmark.slug,
                hero_image_url: bookmark.hero_image_url,
                release_date: bookmark.release_date,
                genres: bookmark.genres,
                created_at: OffsetDateTime::now_utc(),
            };
            let mut bookmarks = bookmarks.lock().await;
            bookmarks
                .entry(uid)
                .or_default()
                .insert(record.doc_id.clone(), record.clone());
            Ok(record)
        })
    }

    fn delete_bookmark(
        &self,
        uid: String,
        doc_id: String,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let bookmarks = Arc::clone(&self.bookmarks);
        Box::pin(async move {
            let mut bookmarks = bookmarks.lock().await;
            if let Some(records) = bookmarks.get_mut(&uid) {
                records.shift_remove(&doc_id);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(uid: &str) -> AuthUser {
        AuthUser {
            uid: uid.into(),
            email: format!("{uid}@example.com"),
            display_name: "Chell".into(),
            photo_url: None,
        }
    }

    fn new_bookmark(name: &str) -> NewBookmark {
        NewBookmark {
            name: name.into(),
            slug: name.to_lowercase().replace(' ', "-"),
            hero_image_url: None,
            release_date: Some("2011-04-18".into()),
            genres: Vec::new(),
        }
    }

    #[tokio::test]
    async fn ensure_profile_keeps_the_original_created_at() {
        let store = MemoryUserStore::new();

        let first = store.ensure_profile(auth_user("u1")).await.unwrap();
        let second = store.ensure_profile(auth_user("u1")).await.unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(first.uid, "u1");
    }

    #[tokio::test]
    async fn bookmarks_list_in_creation_order() {
        let store = MemoryUserStore::new();
        store
            .insert_bookmark("u1".into(), new_bookmark("Portal 2"))
            .await
            .unwrap();
        store
            .insert_bookmark("u1".into(), new_bookmark("Half-Life 2"))
            .await
            .unwrap();

        let listed = store.list_bookmarks("u1".into()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Portal 2");
        assert_eq!(listed[1].name, "Half-Life 2");
    }

    #[tokio::test]
    async fn deleting_a_missing_document_succeeds() {
        let store = MemoryUserStore::new();
        let record = store
            .insert_bookmark("u1".into(), new_bookmark("Portal 2"))
            .await
            .unwrap();

        store
            .delete_bookmark("u1".into(), record.doc_id.clone())
            .await
            .unwrap();
        // Second delete of the same id, and a delete for an unknown user.
        store
            .delete_bookmark("u1".into(), record.doc_id)
            .await
            .unwrap();
        store
            .delete_bookmark("nobody".into(), "doc123".into())
            .await
            .unwrap();

        assert!(store.list_bookmarks("u1".into()).await.unwrap().is_empty());
    }
}
