use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use time::OffsetDateTime;

use crate::dao::catalog::{GameRecord, GenreRef};

/// Identity reported by the authentication provider on sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Stable identifier assigned by the identity provider.
    pub uid: String,
    /// Email address on the identity.
    pub email: String,
    /// Display name on the identity.
    pub display_name: String,
    /// Avatar URL, when the provider has one.
    pub photo_url: Option<String>,
}

/// `users/{uid}` profile document, created once per uid on first sign-in.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity provider uid this profile belongs to.
    pub uid: String,
    /// Email address at profile creation time.
    pub email: String,
    /// Display name at profile creation time.
    pub display_name: String,
    /// Avatar URL, when the provider had one.
    pub photo_url: Option<String>,
    /// Server-assigned creation timestamp; never overwritten on later sign-ins.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A document in the `users/{uid}/bookmarks` collection.
///
/// Created on add, destroyed on remove, never otherwise mutated.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    /// Identifier assigned by the remote store on creation.
    pub doc_id: String,
    /// Display name of the bookmarked game.
    pub name: String,
    /// Catalog slug of the bookmarked game.
    pub slug: String,
    /// Hero image carried over from the catalog record.
    pub hero_image_url: Option<String>,
    /// Release date carried over from the catalog record.
    pub release_date: Option<String>,
    /// Genres carried over from the catalog record.
    pub genres: Vec<GenreRef>,
    /// Server-assigned creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields a caller supplies when creating a bookmark; the store assigns the
/// document id and the creation timestamp.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBookmark {
    /// Display name of the game to bookmark.
    pub name: String,
    /// Catalog slug of the game to bookmark.
    pub slug: String,
    /// Hero image carried over from the catalog record.
    pub hero_image_url: Option<String>,
    /// Release date carried over from the catalog record.
    pub release_date: Option<String>,
    /// Genres carried over from the catalog record.
    pub genres: Vec<GenreRef>,
}

impl From<&GameRecord> for NewBookmark {
    fn from(game: &GameRecord) -> Self {
        Self {
            name: game.name.clone(),
            slug: game.slug.clone(),
            hero_image_url: game.hero_image_url.clone(),
            release_date: game.release_date.clone(),
            genres: game.genres.clone(),
        }
    }
}
