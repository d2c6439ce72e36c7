use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::key::QueryKey;

/// Serializable export of a cache's successful entries.
///
/// Produced by [`QueryCache::dehydrate`](super::QueryCache::dehydrate) after a
/// prefetch pass and consumed by
/// [`QueryCache::hydrate`](super::QueryCache::hydrate) on the other side of a
/// process boundary. Keys present in a snapshot must not re-fetch while still
/// within the freshness window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub(crate) queries: Vec<DehydratedQuery>,
}

impl CacheSnapshot {
    /// Number of entries carried by the snapshot.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the snapshot carries no entries.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// One successful entry inside a snapshot, with its original fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DehydratedQuery {
    pub key: QueryKey,
    pub data: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub fetched_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = CacheSnapshot {
            queries: vec![DehydratedQuery {
                key: QueryKey::new("getGame", ["portal-2"]),
                data: json!({"name": "Portal 2", "slug": "portal-2"}),
                fetched_at: OffsetDateTime::now_utc(),
            }],
        };

        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: CacheSnapshot = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.queries[0].key, snapshot.queries[0].key);
        assert_eq!(decoded.queries[0].data, snapshot.queries[0].data);
        assert_eq!(decoded.queries[0].fetched_at, snapshot.queries[0].fetched_at);
    }

    #[test]
    fn empty_snapshot_reports_empty() {
        let snapshot = CacheSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
    }
}
