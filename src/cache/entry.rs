use std::time::Duration;

use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::QueryError;

/// Lifecycle stage of a cache entry as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// The key has never been fetched (or fetching is disabled for it).
    Idle,
    /// The first fetch for the key is in flight; no data is available yet.
    Loading,
    /// A fetch resolved with data. A background revalidation may be running.
    Success,
    /// The most recent first-load fetch failed.
    Error,
}

/// Resolved state of one cache entry.
///
/// Data is carried only by `Success` and an error only by `Error`, so the
/// status/payload pairing holds by construction.
#[derive(Debug)]
pub(crate) enum EntryState {
    Idle,
    Loading,
    Success {
        data: Value,
        fetched_at: OffsetDateTime,
    },
    Error {
        error: QueryError,
    },
}

/// Token identifying one in-flight request plus its completion signal.
///
/// The sender lives in the slot until the request resolves or the entry is
/// evicted; observers joining the request subscribe to it.
#[derive(Debug)]
pub(crate) struct InFlight {
    pub id: Uuid,
    pub done: watch::Sender<bool>,
}

/// Mutable per-key slot owned by the cache.
#[derive(Debug)]
pub(crate) struct EntrySlot {
    pub state: EntryState,
    pub in_flight: Option<InFlight>,
    /// Last background revalidation failed; known-good data was retained.
    pub refresh_failed: bool,
    /// Entry was explicitly marked stale and must revalidate on the next read.
    pub invalidated: bool,
}

impl EntrySlot {
    pub fn new() -> Self {
        Self {
            state: EntryState::Idle,
            in_flight: None,
            refresh_failed: false,
            invalidated: false,
        }
    }

    /// Register a new in-flight request and return its token and completion
    /// signal. A successful entry keeps its data while revalidating; anything
    /// else becomes `Loading`. Callers must not begin while a request is
    /// already in flight.
    pub fn begin(&mut self) -> (Uuid, watch::Receiver<bool>) {
        let (done, rx) = watch::channel(false);
        let id = Uuid::new_v4();
        self.in_flight = Some(InFlight { id, done });
        if !matches!(self.state, EntryState::Success { .. }) {
            self.state = EntryState::Loading;
        }
        (id, rx)
    }

    /// Apply a request resolution if `id` still matches the in-flight token.
    ///
    /// Returns whether the resolution was applied; a superseded or detached
    /// resolution is discarded without touching the entry. A failed
    /// revalidation of a successful entry keeps the known-good data and only
    /// raises `refresh_failed`.
    pub fn resolve(
        &mut self,
        id: Uuid,
        outcome: Result<(Value, OffsetDateTime), QueryError>,
    ) -> bool {
        if !self.in_flight.as_ref().is_some_and(|f| f.id == id) {
            return false;
        }
        let in_flight = self.in_flight.take();

        match outcome {
            Ok((data, fetched_at)) => {
                self.state = EntryState::Success { data, fetched_at };
                self.refresh_failed = false;
                self.invalidated = false;
            }
            Err(error) => match self.state {
                EntryState::Success { .. } => {
                    self.refresh_failed = true;
                }
                _ => {
                    self.state = EntryState::Error { error };
                }
            },
        }

        if let Some(in_flight) = in_flight {
            let _ = in_flight.done.send(true);
        }
        true
    }

    /// Reset the slot to idle and wake any observers joined to an in-flight
    /// request. Used when the entry is removed from the table.
    pub fn evict(&mut self) {
        self.state = EntryState::Idle;
        self.refresh_failed = false;
        self.invalidated = false;
        if let Some(in_flight) = self.in_flight.take() {
            let _ = in_flight.done.send(true);
        }
    }

    /// Whether the entry holds successful data that is still within `window`
    /// and has not been explicitly invalidated.
    pub fn is_fresh(&self, window: Duration) -> bool {
        if self.invalidated {
            return false;
        }
        match &self.state {
            EntryState::Success { fetched_at, .. } => {
                let age = OffsetDateTime::now_utc() - *fetched_at;
                age < time::Duration::try_from(window).unwrap_or(time::Duration::MAX)
            }
            _ => false,
        }
    }

    /// Untyped view of the slot for observers.
    pub fn view(&self) -> EntryView {
        let (status, data, error, fetched_at) = match &self.state {
            EntryState::Idle => (QueryStatus::Idle, None, None, None),
            EntryState::Loading => (QueryStatus::Loading, None, None, None),
            EntryState::Success { data, fetched_at } => (
                QueryStatus::Success,
                Some(data.clone()),
                None,
                Some(*fetched_at),
            ),
            EntryState::Error { error } => {
                (QueryStatus::Error, None, Some(error.clone()), None)
            }
        };
        EntryView {
            status,
            data,
            error,
            fetched_at,
            is_refreshing: self.in_flight.is_some()
                && matches!(self.state, EntryState::Success { .. }),
            refresh_failed: self.refresh_failed,
        }
    }
}

/// Untyped observer snapshot of a slot, decoded into a typed result by the cache.
#[derive(Debug, Clone)]
pub(crate) struct EntryView {
    pub status: QueryStatus,
    pub data: Option<Value>,
    pub error: Option<QueryError>,
    pub fetched_at: Option<OffsetDateTime>,
    pub is_refreshing: bool,
    pub refresh_failed: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn fetch_error() -> QueryError {
        QueryError::new(ErrorKind::RemoteFetchFailed, "connection reset")
    }

    #[test]
    fn new_slot_is_idle() {
        let slot = EntrySlot::new();
        assert_eq!(slot.view().status, QueryStatus::Idle);
        assert!(slot.view().data.is_none());
        assert!(slot.view().error.is_none());
    }

    #[test]
    fn begin_moves_idle_to_loading() {
        let mut slot = EntrySlot::new();
        let (_, _rx) = slot.begin();
        assert_eq!(slot.view().status, QueryStatus::Loading);
        assert!(!slot.view().is_refreshing);
    }

    #[test]
    fn successful_resolution_stores_data() {
        let mut slot = EntrySlot::new();
        let (id, _rx) = slot.begin();
        let applied = slot.resolve(id, Ok((json!({"name": "Portal 2"}), OffsetDateTime::now_utc())));

        assert!(applied);
        let view = slot.view();
        assert_eq!(view.status, QueryStatus::Success);
        assert!(view.data.is_some());
        assert!(view.error.is_none());
        assert!(view.fetched_at.is_some());
    }

    #[test]
    fn failed_first_load_stores_error() {
        let mut slot = EntrySlot::new();
        let (id, _rx) = slot.begin();
        slot.resolve(id, Err(fetch_error()));

        let view = slot.view();
        assert_eq!(view.status, QueryStatus::Error);
        assert!(view.data.is_none());
        assert!(view.error.is_some());
    }

    #[test]
    fn refetch_after_error_goes_through_loading_not_idle() {
        let mut slot = EntrySlot::new();
        let (id, _rx) = slot.begin();
        slot.resolve(id, Err(fetch_error()));

        let (_, _rx) = slot.begin();
        assert_eq!(slot.view().status, QueryStatus::Loading);
    }

    #[test]
    fn failed_revalidation_keeps_known_good_data() {
        let mut slot = EntrySlot::new();
        let (id, _rx) = slot.begin();
        slot.resolve(id, Ok((json!(["a"]), OffsetDateTime::now_utc())));

        let (id, _rx) = slot.begin();
        assert!(slot.view().is_refreshing);
        slot.resolve(id, Err(fetch_error()));

        let view = slot.view();
        assert_eq!(view.status, QueryStatus::Success);
        assert_eq!(view.data, Some(json!(["a"])));
        assert!(view.refresh_failed);
        assert!(!view.is_refreshing);
    }

    #[test]
    fn successful_revalidation_clears_refresh_failure() {
        let mut slot = EntrySlot::new();
        let (id, _rx) = slot.begin();
        slot.resolve(id, Ok((json!(1), OffsetDateTime::now_utc())));
        let (id, _rx) = slot.begin();
        slot.resolve(id, Err(fetch_error()));
        assert!(slot.view().refresh_failed);

        let (id, _rx) = slot.begin();
        slot.resolve(id, Ok((json!(2), OffsetDateTime::now_utc())));

        let view = slot.view();
        assert!(!view.refresh_failed);
        assert_eq!(view.data, Some(json!(2)));
    }

    #[test]
    fn mismatched_token_is_discarded() {
        let mut slot = EntrySlot::new();
        let (_, _rx) = slot.begin();
        let applied = slot.resolve(
            Uuid::new_v4(),
            Ok((json!("late"), OffsetDateTime::now_utc())),
        );

        assert!(!applied);
        assert_eq!(slot.view().status, QueryStatus::Loading);
    }

    #[test]
    fn evict_wakes_joined_observers() {
        let mut slot = EntrySlot::new();
        let (id, rx) = slot.begin();
        slot.evict();

        assert!(*rx.borrow());
        assert_eq!(slot.view().status, QueryStatus::Idle);
        // A late resolution for the evicted request must not resurrect data.
        assert!(!slot.resolve(id, Ok((json!("late"), OffsetDateTime::now_utc()))));
        assert_eq!(slot.view().status, QueryStatus::Idle);
    }
}
