//! Session tracking over a shared identity-provider subscription.
//!
//! One logical provider subscription exists per process: the first live
//! [`SessionHandle`] spawns the listener task and dropping the last one tears
//! it down, so observers never stack up duplicate subscriptions.

use std::sync::{Arc, Mutex, PoisonError};

use futures::{StreamExt, stream::BoxStream};
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::warn;

use crate::{
    dao::{
        models::{AuthUser, UserProfile},
        user_store::UserStore,
    },
    error::{ErrorKind, QueryError},
};

/// Authentication state change pushed by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// An identity finished signing in.
    SignedIn(AuthUser),
    /// The identity signed out.
    SignedOut,
    /// The provider subscription reported an error.
    Failed(String),
}

/// Source of authentication state changes.
pub trait IdentityGateway: Send + Sync {
    /// Stream of auth state changes. Implementations push the current state
    /// to a fresh subscriber first.
    fn events(&self) -> BoxStream<'static, AuthEvent>;
}

/// Identity gateway for tests and embedders, driven by [`MemoryIdentityGateway::emit`].
///
/// New subscribers immediately observe the most recent event, matching how a
/// real provider reports its current state on attach.
#[derive(Debug, Clone)]
pub struct MemoryIdentityGateway {
    events: watch::Sender<Option<AuthEvent>>,
}

impl Default for MemoryIdentityGateway {
    fn default() -> Self {
        let (events, _) = watch::channel(None);
        Self { events }
    }
}

impl MemoryIdentityGateway {
    /// Create a gateway with no auth state yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new auth state to every subscriber.
    pub fn emit(&self, event: AuthEvent) {
        self.events.send_replace(Some(event));
    }
}

impl IdentityGateway for MemoryIdentityGateway {
    fn events(&self) -> BoxStream<'static, AuthEvent> {
        let stream = WatchStream::new(self.events.subscribe());
        Box::pin(stream.filter_map(|event| async move { event }))
    }
}

/// Current authentication state as rendered to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No identity is signed in.
    SignedOut,
    /// An identity is signing in; its profile is being materialized.
    Loading,
    /// An identity is signed in.
    SignedIn(UserProfile),
    /// The provider subscription failed. Reported, not fatal; the caller may
    /// keep rendering a signed-out experience.
    Error(QueryError),
}

/// Tracks the authenticated identity and lazily materializes the profile
/// document on first sign-in.
pub struct SessionService {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    gateway: Arc<dyn IdentityGateway>,
    store: Arc<dyn UserStore>,
    state: watch::Sender<SessionState>,
    listener: Mutex<ListenerSlot>,
}

#[derive(Default)]
struct ListenerSlot {
    subscribers: usize,
    task: Option<JoinHandle<()>>,
}

impl SessionService {
    /// Build a service over an identity gateway and a user document store.
    pub fn new(gateway: Arc<dyn IdentityGateway>, store: Arc<dyn UserStore>) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        Self {
            inner: Arc::new(SessionInner {
                gateway,
                store,
                state,
                listener: Mutex::new(ListenerSlot::default()),
            }),
        }
    }

    /// Latest session state without subscribing.
    pub fn current(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Attach a handle observing session state changes.
    ///
    /// The first live handle spawns the provider subscription; dropping the
    /// last one tears it down. Must be called from within a tokio runtime.
    pub fn subscribe(&self) -> SessionHandle {
        let mut slot = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.subscribers += 1;
        if slot.task.is_none() {
            slot.task = Some(tokio::spawn(run_listener(Arc::clone(&self.inner))));
        }
        SessionHandle {
            rx: self.inner.state.subscribe(),
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Observer handle onto the session state.
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    /// Latest session state.
    pub fn current(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Wait for the next state change and return the new state. Returns the
    /// latest state immediately if the service was dropped.
    pub async fn changed(&mut self) -> SessionState {
        let _ = self.rx.changed().await;
        self.rx.borrow_and_update().clone()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let mut slot = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.subscribers = slot.subscribers.saturating_sub(1);
        if slot.subscribers == 0 {
            if let Some(task) = slot.task.take() {
                task.abort();
            }
        }
    }
}

async fn run_listener(inner: Arc<SessionInner>) {
    let mut events = inner.gateway.events();
    while let Some(event) = events.next().await {
        match event {
            AuthEvent::SignedOut => {
                inner.state.send_replace(SessionState::SignedOut);
            }
            AuthEvent::Failed(message) => {
                warn!(error = %message, "identity provider subscription failed");
                inner.state.send_replace(SessionState::Error(QueryError::new(
                    ErrorKind::AuthStateFailed,
                    message,
                )));
            }
            AuthEvent::SignedIn(user) => {
                inner.state.send_replace(SessionState::Loading);
                let profile = match inner.store.ensure_profile(user.clone()).await {
                    Ok(profile) => profile,
                    Err(err) => {
                        // Profile creation failing must not block sign-in.
                        let err = QueryError::new(
                            ErrorKind::ProfileCreationFailed,
                            crate::error::render_chain(&err),
                        );
                        warn!(
                            uid = %user.uid,
                            error = %err,
                            "failed to materialize profile document; continuing sign-in"
                        );
                        provisional_profile(user)
                    }
                };
                inner.state.send_replace(SessionState::SignedIn(profile));
            }
        }
    }
}

/// Profile assembled from the provider identity alone, used when the document
/// store could not be reached.
fn provisional_profile(user: AuthUser) -> UserProfile {
    UserProfile {
        uid: user.uid,
        email: user.email,
        display_name: user.display_name,
        photo_url: user.photo_url,
        created_at: OffsetDateTime::now_utc(),
    }
}
