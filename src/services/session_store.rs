// src/services/session_store.rs
//
// Session Store - the single source of truth for "who is signed in"
//
// CRITICAL RULES:
// - The provider listener is registered BEFORE the initial session fetch
// - Every commit bumps the generation; a fetch result is committed only if
//   no other commit happened while it was in flight
// - `loading` is true until the first resolution, whatever its outcome
// - Sign-out failures leave the user signed in and are reported, never panicked

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::{AuthChangeEvent, Session, User};
use crate::error::AppResult;
use crate::events::{AuthStateChanged, EventBus, Subscription};
use crate::integrations::AuthProvider;
use crate::services::navigation::Navigator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub loading: bool,
}

impl SessionState {
    /// Before the first resolution
    pub fn initial() -> Self {
        Self {
            user: None,
            session: None,
            loading: true,
        }
    }

    /// A resolved state; the user always mirrors the session
    pub fn resolved(session: Option<Session>) -> Self {
        Self {
            user: session.as_ref().map(|s| s.user.clone()),
            session,
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SignOutOutcome {
    SignedOut,
    Failed(String),
}

pub struct SessionStore {
    inner: Arc<SessionInner>,
    listener: Mutex<Option<Subscription>>,
}

struct SessionInner {
    auth: Arc<dyn AuthProvider>,
    event_bus: Arc<EventBus>,
    navigator: Arc<Navigator>,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl SessionInner {
    /// Provider transition: always authoritative
    fn apply(&self, change: AuthChangeEvent, session: Option<Session>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let user_id = session.as_ref().map(|s| s.user.id);
        self.state.send_replace(SessionState::resolved(session));

        if change == AuthChangeEvent::SignedIn && self.navigator.strip_oauth_markers() {
            log::debug!("Removed OAuth markers from location");
        }

        self.event_bus.emit(AuthStateChanged::new(change, user_id));
    }

    fn finish_loading(&self) {
        self.state.send_if_modified(|state| {
            let was_loading = state.loading;
            state.loading = false;
            was_loading
        });
    }
}

impl SessionStore {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        event_bus: Arc<EventBus>,
        navigator: Arc<Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            inner: Arc::new(SessionInner {
                auth,
                event_bus,
                navigator,
                state,
                generation: AtomicU64::new(0),
            }),
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to provider transitions, then resolve the initial session
    pub async fn start(&self) {
        let weak = Arc::downgrade(&self.inner);
        let subscription = self
            .inner
            .auth
            .on_auth_state_change(Arc::new(move |change, session| {
                if let Some(inner) = weak.upgrade() {
                    inner.apply(change, session);
                }
            }));
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(subscription);

        self.resolve_initial().await;
    }

    async fn resolve_initial(&self) {
        let started = self.inner.generation.load(Ordering::SeqCst);

        let session = match self.inner.auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Could not restore session: {}", e);
                None
            }
        };

        let current = self
            .inner
            .generation
            .compare_exchange(started, started + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();

        if current {
            let user_id = session.as_ref().map(|s| s.user.id);
            self.inner.state.send_replace(SessionState::resolved(session));
            self.inner
                .event_bus
                .emit(AuthStateChanged::new(AuthChangeEvent::InitialSession, user_id));
        } else {
            log::debug!("Discarding initial session superseded by a provider event");
        }

        self.inner.finish_loading();
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Sign out. On failure the previous user stays signed in.
    pub async fn sign_out(&self) -> SignOutOutcome {
        self.inner.state.send_modify(|state| state.loading = true);

        match self.inner.auth.sign_out().await {
            Ok(()) => {
                // The provider announces SIGNED_OUT as well; committing here
                // covers providers that do not
                self.inner.generation.fetch_add(1, Ordering::SeqCst);
                self.inner.state.send_replace(SessionState::resolved(None));
                SignOutOutcome::SignedOut
            }
            Err(e) => {
                log::error!("Sign out failed: {}", e);
                self.inner.finish_loading();
                SignOutOutcome::Failed(e.to_string())
            }
        }
    }

    /// Force a token refresh; the new session arrives through the listener
    pub async fn refresh_session(&self) -> AppResult<Session> {
        self.inner.auth.refresh_session().await
    }
}
