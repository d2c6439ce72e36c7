use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Metadata the catalog exposes for one game.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Stable numeric catalog identifier.
    pub id: u64,
    /// URL-safe identifier used to address the game.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Release date as reported by the catalog, when known.
    pub release_date: Option<String>,
    /// Rich-text description. Treated as an opaque string end to end; it is
    /// never interpreted or executed here.
    pub description: String,
    /// Hero/background image URL, when the catalog has one.
    pub hero_image_url: Option<String>,
    /// Genres the game is filed under.
    pub genres: Vec<GenreRef>,
    /// Names of the platform families the game shipped on.
    pub platforms: Vec<String>,
    /// Community rating, when available.
    pub rating: Option<f64>,
    /// Upper bound of the rating scale, when available.
    pub rating_top: Option<u32>,
    /// Metacritic score, when available.
    pub metacritic: Option<i32>,
    /// Official website URL, when available.
    pub website_url: Option<String>,
    /// Subreddit URL, when available.
    pub reddit_url: Option<String>,
    /// Rating distribution in the order the catalog ranks it.
    pub rating_breakdown: Vec<RatingSlice>,
}

/// Reference to a genre a game is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRef {
    /// Display name of the genre.
    pub name: String,
    /// URL-safe identifier of the genre.
    pub slug: String,
}

/// One bucket of the community rating distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSlice {
    /// Bucket label, e.g. "exceptional" or "meh".
    pub label: String,
    /// Share of ratings that fell into the bucket.
    pub percent: f64,
}

/// One screenshot attached to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotRecord {
    /// Image URL.
    pub image_url: String,
}

/// Envelope the catalog wraps list responses in.
#[derive(Debug, Deserialize)]
pub(super) struct ResultsPage<T> {
    #[serde(default)]
    pub results: Vec<T>,
}

/// Wire shape of a game as the catalog serves it.
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawGame {
    pub id: u64,
    pub slug: String,
    pub name: String,
    pub released: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub background_image: Option<String>,
    #[serde(default)]
    pub genres: Vec<RawGenre>,
    #[serde(default)]
    pub parent_platforms: Vec<RawParentPlatform>,
    pub rating: Option<f64>,
    pub rating_top: Option<u32>,
    pub metacritic: Option<i32>,
    pub website: Option<String>,
    pub reddit_url: Option<String>,
    #[serde(default)]
    pub ratings: Vec<RawRating>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawGenre {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawParentPlatform {
    pub platform: RawPlatform,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawPlatform {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawRating {
    pub title: String,
    pub percent: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawScreenshot {
    pub image: String,
}

impl From<RawGame> for GameRecord {
    fn from(raw: RawGame) -> Self {
        Self {
            id: raw.id,
            slug: raw.slug,
            name: raw.name,
            release_date: raw.released.filter(|value| !value.is_empty()),
            description: raw.description.unwrap_or_default(),
            hero_image_url: raw.background_image.filter(|value| !value.is_empty()),
            genres: raw.genres.into_iter().map(Into::into).collect(),
            platforms: raw
                .parent_platforms
                .into_iter()
                .map(|entry| entry.platform.name)
                .collect(),
            rating: raw.rating,
            rating_top: raw.rating_top,
            metacritic: raw.metacritic,
            website_url: raw.website.filter(|value| !value.is_empty()),
            reddit_url: raw.reddit_url.filter(|value| !value.is_empty()),
            rating_breakdown: raw.ratings.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RawGenre> for GenreRef {
    fn from(raw: RawGenre) -> Self {
        Self {
            name: raw.name,
            slug: raw.slug,
        }
    }
}

impl From<RawRating> for RatingSlice {
    fn from(raw: RawRating) -> Self {
        Self {
            label: raw.title,
            percent: raw.percent,
        }
    }
}

impl From<RawScreenshot> for ScreenshotRecord {
    fn from(raw: RawScreenshot) -> Self {
        Self {
            image_url: raw.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_wire_shape_decodes_and_flattens() {
        let raw: RawGame = serde_json::from_str(
            r#"{
                "id": 4427,
                "slug": "portal-2",
                "name": "Portal 2",
                "released": "2011-04-18",
                "description": "<p>Portal 2 is a first-person puzzle game.</p>",
                "background_image": "https://media.example/portal-2.jpg",
                "genres": [{"name": "Puzzle", "slug": "puzzle"}],
                "parent_platforms": [
                    {"platform": {"name": "PC"}},
                    {"platform": {"name": "PlayStation"}}
                ],
                "rating": 4.61,
                "rating_top": 5,
                "metacritic": 95,
                "website": "https://www.thinkwithportals.com",
                "reddit_url": "https://www.reddit.com/r/Portal",
                "ratings": [
                    {"title": "exceptional", "percent": 80.0, "count": 2000},
                    {"title": "recommended", "percent": 15.0, "count": 400}
                ]
            }"#,
        )
        .unwrap();

        let game = GameRecord::from(raw);
        assert_eq!(game.name, "Portal 2");
        assert_eq!(game.slug, "portal-2");
        assert_eq!(game.metacritic, Some(95));
        assert_eq!(game.release_date.as_deref(), Some("2011-04-18"));
        assert_eq!(game.platforms, vec!["PC", "PlayStation"]);
        assert_eq!(game.genres.len(), 1);
        assert_eq!(game.genres[0].slug, "puzzle");
        assert_eq!(game.rating_breakdown[0].label, "exceptional");
        assert!(game.description.contains("puzzle game"));
    }

    #[test]
    fn absent_optional_fields_stay_absent() {
        let raw: RawGame = serde_json::from_str(
            r#"{"id": 1, "slug": "obscure", "name": "Obscure", "released": null,
                "background_image": null, "rating": null, "rating_top": null,
                "metacritic": null, "website": "", "reddit_url": null}"#,
        )
        .unwrap();

        let game = GameRecord::from(raw);
        assert_eq!(game.release_date, None);
        assert_eq!(game.hero_image_url, None);
        assert_eq!(game.website_url, None);
        assert_eq!(game.metacritic, None);
        assert!(game.genres.is_empty());
        assert!(game.platforms.is_empty());
        assert!(game.rating_breakdown.is_empty());
        assert_eq!(game.description, "");
    }

    #[test]
    fn screenshots_envelope_decodes() {
        let page: ResultsPage<RawScreenshot> =
            serde_json::from_str(r#"{"count": 2, "results": [{"image": "a.jpg"}, {"image": "b.jpg"}]}"#)
                .unwrap();
        let shots: Vec<ScreenshotRecord> = page.results.into_iter().map(Into::into).collect();
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].image_url, "a.jpg");
    }
}
