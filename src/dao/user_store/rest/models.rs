use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use time::OffsetDateTime;

use crate::dao::{
    catalog::GenreRef,
    models::{AuthUser, BookmarkRecord},
};

/// Path of the `users/{uid}` profile document.
pub(super) fn profile_path(uid: &str) -> String {
    format!("users/{uid}")
}

/// Path of the `users/{uid}/bookmarks` collection.
pub(super) fn bookmarks_path(uid: &str) -> String {
    format!("users/{uid}/bookmarks")
}

/// Path of one document inside `users/{uid}/bookmarks`.
pub(super) fn bookmark_path(uid: &str, doc_id: &str) -> String {
    format!("users/{uid}/bookmarks/{doc_id}")
}

/// Body sent when creating the profile document; the service assigns
/// `created_at`.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub(super) struct ProfileBody {
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl From<&AuthUser> for ProfileBody {
    fn from(user: &AuthUser) -> Self {
        Self {
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}

/// Wire shape of one document in `users/{uid}/bookmarks`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct BookmarkDocument {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub hero_image_url: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Envelope the service wraps collection listings in.
#[derive(Debug, Deserialize)]
pub(super) struct BookmarkPage {
    #[serde(default)]
    pub items: Vec<BookmarkDocument>,
}

impl From<BookmarkDocument> for BookmarkRecord {
    fn from(doc: BookmarkDocument) -> Self {
        Self {
            doc_id: doc.id,
            name: doc.name,
            slug: doc.slug,
            hero_image_url: doc.hero_image_url,
            release_date: doc.release_date,
            genres: doc.genres,
            created_at: doc.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookmark_document_maps_onto_the_record() {
        let page: BookmarkPage = serde_json::from_str(
            r#"{"items": [{
                "id": "doc123",
                "name": "Portal 2",
                "slug": "portal-2",
                "hero_image_url": "https://media.example/portal-2.jpg",
                "release_date": "2011-04-18",
                "genres": [{"name": "Puzzle", "slug": "puzzle"}],
                "created_at": "2024-05-02T10:30:00Z"
            }]}"#,
        )
        .unwrap();

        let record = BookmarkRecord::from(page.items[0].clone());
        assert_eq!(record.doc_id, "doc123");
        assert_eq!(record.name, "Portal 2");
        assert_eq!(record.genres[0].slug, "puzzle");
    }

    #[test]
    fn profile_body_omits_a_missing_photo() {
        let body = ProfileBody {
            email: "chell@example.com".into(),
            display_name: "Chell".into(),
            photo_url: None,
        };
        let encoded = serde_json::to_string(&body).unwrap();
        assert!(!encoded.contains("photo_url"));
    }

    #[test]
    fn document_paths_are_nested_per_user() {
        assert_eq!(profile_path("u1"), "users/u1");
        assert_eq!(bookmarks_path("u1"), "users/u1/bookmarks");
        assert_eq!(bookmark_path("u1", "doc123"), "users/u1/bookmarks/doc123");
    }
}
