//! Keyed cache over asynchronous fetch functions.
//!
//! Maps a [`QueryKey`] to a lazily computed, deduplicated, cacheable value.
//! Concurrent observers of one key are serialized onto a single in-flight
//! request, stale entries are served immediately while revalidating in the
//! background, and successful entries can be exported with [`QueryCache::dehydrate`]
//! and re-imported with [`QueryCache::hydrate`] on another process boundary
//! without re-fetching.

mod debounce;
mod entry;
mod key;
mod snapshot;

pub use debounce::Debouncer;
pub use entry::QueryStatus;
pub use key::QueryKey;
pub use snapshot::CacheSnapshot;

use std::{future::Future, sync::Arc, time::Duration};

use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::CacheConfig,
    error::{ErrorKind, QueryError},
};
use entry::{EntrySlot, EntryState, EntryView};
use snapshot::DehydratedQuery;

type SharedSlot = Arc<Mutex<EntrySlot>>;

/// Per-call options for [`QueryCache::query`].
#[derive(Debug, Clone)]
pub struct QueryOptions {
    enabled: bool,
    stale_after: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_after: None,
        }
    }
}

impl QueryOptions {
    /// Options with fetching enabled and the cache-wide freshness window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate fetching. A disabled key is never fetched and stays idle; used to
    /// defer a query until a required parameter (e.g. a route slug) is known.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Override the cache-wide freshness window for this call.
    pub fn stale_after(mut self, window: Duration) -> Self {
        self.stale_after = Some(window);
        self
    }
}

/// Observer-facing snapshot of one cache entry, decoded to the caller's type.
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    status: QueryStatus,
    data: Option<T>,
    error: Option<QueryError>,
    fetched_at: Option<OffsetDateTime>,
    is_refreshing: bool,
    refresh_failed: bool,
}

impl<T> QueryResult<T> {
    /// A successful result that never touched the network, e.g. an empty
    /// search term.
    pub(crate) fn ready(data: T) -> Self {
        Self {
            status: QueryStatus::Success,
            data: Some(data),
            error: None,
            fetched_at: Some(OffsetDateTime::now_utc()),
            is_refreshing: false,
            refresh_failed: false,
        }
    }

    fn failure(error: QueryError) -> Self {
        Self {
            status: QueryStatus::Error,
            data: None,
            error: Some(error),
            fetched_at: None,
            is_refreshing: false,
            refresh_failed: false,
        }
    }

    /// Lifecycle stage of the entry at observation time.
    pub fn status(&self) -> QueryStatus {
        self.status
    }

    /// Cached data; present exactly when the status is success.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the result, keeping only the data.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Captured failure; present exactly when the status is error.
    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    /// When the data was fetched (or prefetched, for hydrated entries).
    pub fn fetched_at(&self) -> Option<OffsetDateTime> {
        self.fetched_at
    }

    /// A background revalidation is in flight while stale data is served.
    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }

    /// The most recent background revalidation failed; data is the last
    /// known-good value.
    pub fn refresh_failed(&self) -> bool {
        self.refresh_failed
    }

    /// Whether the entry resolved with data.
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    /// Whether the entry captured a first-load failure.
    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Whether the first fetch for the entry is still in flight.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }
}

impl EntryView {
    fn into_result<T: DeserializeOwned>(self) -> QueryResult<T> {
        let EntryView {
            status,
            data,
            error,
            fetched_at,
            is_refreshing,
            refresh_failed,
        } = self;
        match data {
            Some(value) => match serde_json::from_value::<T>(value) {
                Ok(data) => QueryResult {
                    status,
                    data: Some(data),
                    error,
                    fetched_at,
                    is_refreshing,
                    refresh_failed,
                },
                Err(err) => QueryResult::failure(QueryError::new(
                    ErrorKind::RemoteFetchFailed,
                    format!("cached payload has unexpected shape: {err}"),
                )),
            },
            None => QueryResult {
                status,
                data: None,
                error,
                fetched_at,
                is_refreshing,
                refresh_failed,
            },
        }
    }
}

/// What a read has to do after inspecting the entry under its lock.
enum ReadStep {
    Serve(EntryView),
    Join(watch::Receiver<bool>),
    Fetch(Uuid),
    Revalidate { id: Uuid, view: EntryView },
}

/// Keyed entry table plus the resolution logic that is its single writer.
pub struct QueryCache {
    entries: DashMap<QueryKey, SharedSlot>,
    freshness_window: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl QueryCache {
    /// Build a cache with the configured freshness window.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            freshness_window: config.freshness_window(),
        }
    }

    /// Read the entry for `key`, fetching it if needed.
    ///
    /// Concurrent observers of one key share a single fetch invocation; a
    /// stale successful entry is served immediately while a background
    /// revalidation runs; a failed entry re-enters loading on the next call.
    /// Failures are captured into the returned result, never raised.
    pub async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        fetch: F,
        options: QueryOptions,
    ) -> QueryResult<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let slot = self.slot(&key);
        if !options.enabled {
            let guard = slot.lock().await;
            return guard.view().into_result();
        }

        let freshness = options.stale_after.unwrap_or(self.freshness_window);
        let step = {
            let mut guard = slot.lock().await;
            Self::plan_read(&mut guard, freshness)
        };

        match step {
            ReadStep::Serve(view) => view.into_result(),
            ReadStep::Join(mut done) => {
                debug!(%key, "joining in-flight request");
                Self::await_done(&mut done).await;
                let guard = slot.lock().await;
                guard.view().into_result()
            }
            ReadStep::Fetch(id) => Self::run_fetch(&slot, id, fetch).await,
            ReadStep::Revalidate { id, view } => {
                let task_slot = Arc::clone(&slot);
                let fut = fetch();
                tokio::spawn(async move {
                    let outcome = match fut.await {
                        Ok(data) => {
                            Self::encode(&data).map(|value| (value, OffsetDateTime::now_utc()))
                        }
                        Err(error) => Err(error),
                    };
                    Self::apply(&task_slot, id, outcome).await;
                });
                view.into_result()
            }
        }
    }

    /// Execute the fetch now and store the result as if it had been queried.
    ///
    /// Used before the consuming view exists (server-side rendering); no
    /// observer is required and failures are captured into the entry. A fresh
    /// successful entry short-circuits; an in-flight request is joined.
    pub async fn prefetch<T, F, Fut>(&self, key: QueryKey, fetch: F)
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let slot = self.slot(&key);
        let step = {
            let mut guard = slot.lock().await;
            if let Some(in_flight) = &guard.in_flight {
                Some(JoinOrRun::Join(in_flight.done.subscribe()))
            } else if guard.is_fresh(self.freshness_window) {
                None
            } else {
                Some(JoinOrRun::Run(guard.begin().0))
            }
        };
        match step {
            None => {}
            Some(JoinOrRun::Join(mut done)) => Self::await_done(&mut done).await,
            Some(JoinOrRun::Run(id)) => {
                let _ = Self::run_fetch::<T, F, Fut>(&slot, id, fetch).await;
            }
        }
    }

    /// Revalidate `key` now and wait for the result.
    ///
    /// Unlike [`QueryCache::query`] this never serves a fresh entry without
    /// hitting the remote; mutation paths use it to reconcile a cached list
    /// with the remote store. A failed revalidation keeps known-good data.
    pub async fn refetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> QueryResult<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let slot = self.slot(&key);
        let step = {
            let mut guard = slot.lock().await;
            if let Some(in_flight) = &guard.in_flight {
                JoinOrRun::Join(in_flight.done.subscribe())
            } else {
                JoinOrRun::Run(guard.begin().0)
            }
        };
        match step {
            JoinOrRun::Join(mut done) => {
                Self::await_done(&mut done).await;
                let guard = slot.lock().await;
                guard.view().into_result()
            }
            JoinOrRun::Run(id) => Self::run_fetch(&slot, id, fetch).await,
        }
    }

    /// Mark a successful entry stale so the next read revalidates remotely.
    pub async fn invalidate(&self, key: &QueryKey) {
        let Some(slot) = self.entries.get(key).map(|entry| Arc::clone(entry.value())) else {
            return;
        };
        let mut guard = slot.lock().await;
        if matches!(guard.state, EntryState::Success { .. }) {
            guard.invalidated = true;
        }
    }

    /// Drop the entry for `key` entirely.
    ///
    /// Observers joined to an in-flight request wake and observe an idle
    /// entry; the request's late resolution is discarded.
    pub async fn remove(&self, key: &QueryKey) {
        if let Some((_, slot)) = self.entries.remove(key) {
            let mut guard = slot.lock().await;
            guard.evict();
        }
    }

    /// Export every successful entry, with its original fetch time, in a
    /// stable key order.
    pub async fn dehydrate(&self) -> CacheSnapshot {
        let slots: Vec<(QueryKey, SharedSlot)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut queries = Vec::new();
        for (key, slot) in slots {
            let guard = slot.lock().await;
            if let EntryState::Success { data, fetched_at } = &guard.state {
                queries.push(DehydratedQuery {
                    key,
                    data: data.clone(),
                    fetched_at: *fetched_at,
                });
            }
        }
        queries.sort_by(|a, b| a.key.cmp(&b.key));
        CacheSnapshot { queries }
    }

    /// Seed entries from a snapshot produced by [`QueryCache::dehydrate`].
    ///
    /// Hydrated entries keep the `fetched_at` they had at prefetch time, so a
    /// subsequent read within the freshness window serves them without
    /// re-fetching. A live successful entry newer than the snapshot wins.
    pub async fn hydrate(&self, snapshot: CacheSnapshot) {
        for query in snapshot.queries {
            let slot = self.slot(&query.key);
            let mut guard = slot.lock().await;
            let apply = match &guard.state {
                EntryState::Idle | EntryState::Error { .. } => true,
                EntryState::Success { fetched_at, .. } => *fetched_at < query.fetched_at,
                EntryState::Loading => false,
            };
            if apply {
                guard.state = EntryState::Success {
                    data: query.data,
                    fetched_at: query.fetched_at,
                };
                guard.refresh_failed = false;
                guard.invalidated = false;
            }
        }
    }

    fn slot(&self, key: &QueryKey) -> SharedSlot {
        self.entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(EntrySlot::new())))
            .clone()
    }

    fn plan_read(guard: &mut EntrySlot, freshness: Duration) -> ReadStep {
        if let Some(in_flight) = &guard.in_flight {
            // At-most-one-in-flight: join the pending request instead of
            // starting a second call. A successful entry mid-revalidation is
            // served immediately rather than awaited.
            if matches!(guard.state, EntryState::Success { .. }) {
                return ReadStep::Serve(guard.view());
            }
            return ReadStep::Join(in_flight.done.subscribe());
        }

        let successful = matches!(guard.state, EntryState::Success { .. });
        if successful && guard.is_fresh(freshness) {
            return ReadStep::Serve(guard.view());
        }
        if successful {
            let (id, _) = guard.begin();
            return ReadStep::Revalidate {
                id,
                view: guard.view(),
            };
        }
        // Idle or error: fetch now. An error entry re-enters loading here,
        // never idle.
        let (id, _) = guard.begin();
        ReadStep::Fetch(id)
    }

    async fn run_fetch<T, F, Fut>(slot: &SharedSlot, id: Uuid, fetch: F) -> QueryResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        match fetch().await {
            Ok(data) => {
                let fetched_at = OffsetDateTime::now_utc();
                match Self::encode(&data) {
                    Ok(value) => {
                        Self::apply(slot, id, Ok((value, fetched_at))).await;
                        QueryResult {
                            status: QueryStatus::Success,
                            data: Some(data),
                            error: None,
                            fetched_at: Some(fetched_at),
                            is_refreshing: false,
                            refresh_failed: false,
                        }
                    }
                    Err(error) => {
                        Self::apply(slot, id, Err(error.clone())).await;
                        QueryResult::failure(error)
                    }
                }
            }
            Err(error) => {
                Self::apply(slot, id, Err(error.clone())).await;
                QueryResult::failure(error)
            }
        }
    }

    /// Apply a resolution to the entry unless a newer request or an eviction
    /// superseded it (stale-response guard).
    async fn apply(
        slot: &SharedSlot,
        id: Uuid,
        outcome: Result<(Value, OffsetDateTime), QueryError>,
    ) {
        let mut guard = slot.lock().await;
        if !guard.resolve(id, outcome) {
            debug!(request = %id, "discarding resolution for a superseded request");
        }
    }

    fn encode<T: Serialize>(data: &T) -> Result<Value, QueryError> {
        serde_json::to_value(data).map_err(|err| {
            QueryError::new(
                ErrorKind::RemoteFetchFailed,
                format!("failed to encode fetched value: {err}"),
            )
        })
    }

    async fn await_done(done: &mut watch::Receiver<bool>) {
        loop {
            if *done.borrow_and_update() {
                return;
            }
            // A dropped sender means the entry was evicted mid-flight.
            if done.changed().await.is_err() {
                return;
            }
        }
    }
}

enum JoinOrRun {
    Join(watch::Receiver<bool>),
    Run(Uuid),
}
