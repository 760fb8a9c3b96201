// src/services/test_support.rs
//
// In-memory collaborators for service tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::domain::{AuthChangeEvent, MovieDetails, MovieRecord, Session, User, UserMetadata};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, ProviderAuthEvent, Subscription};
use crate::integrations::{
    AuthProvider, AuthStateCallback, ChangeCallback, ChangeFeed, ChangeFilter, ChangeKind,
    FeedSubscription, OAuthProvider, RowChange, SignUpOutcome, SignUpRequest,
};

pub fn fake_user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
        email_confirmed_at: Some(Utc::now()),
        created_at: Some(Utc::now()),
        user_metadata: UserMetadata::default(),
    }
}

pub fn fake_session(user: User) -> Session {
    Session {
        access_token: format!("access-{}", user.id),
        refresh_token: format!("refresh-{}", user.id),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: Some(Utc::now().timestamp() + 3600),
        user,
    }
}

pub fn sample_movie(user_id: Uuid, title: &str, rating: u8, is_favorite: bool) -> MovieRecord {
    let now = Utc::now();
    MovieRecord {
        id: Uuid::new_v4(),
        user_id,
        title: title.to_string(),
        year: Some(1972),
        poster: None,
        plot: None,
        genre: Some("Crime, Drama".to_string()),
        runtime: Some(175),
        rating: Some(rating),
        review: None,
        is_favorite,
        created_at: now,
        updated_at: now,
    }
}

pub fn godfather_details() -> MovieDetails {
    MovieDetails {
        id: "tt0068646".to_string(),
        title: "The Godfather".to_string(),
        year: Some(1972),
        poster: Some("https://img/godfather.jpg".to_string()),
        plot: Some("The aging patriarch of an organized crime dynasty...".to_string()),
        genre: Some("Crime, Drama".to_string()),
        runtime: Some(175),
        director: Some("Francis Ford Coppola".to_string()),
        actors: Some("Marlon Brando, Al Pacino".to_string()),
        rated: Some("R".to_string()),
    }
}

// ============================================================================
// AUTH PROVIDER
// ============================================================================

#[derive(Default)]
struct Failures {
    get_session: Option<String>,
    get_user: Option<String>,
    sign_in: Option<(u16, String)>,
    sign_out: Option<String>,
}

/// Auth provider holding its session in memory.
/// Requests that should fail are configured up front.
pub struct FakeAuthProvider {
    session: Mutex<Option<Session>>,
    listeners: EventBus,
    failures: Mutex<Failures>,
    gate: Option<Arc<Notify>>,
    sign_up_confirmed: Mutex<bool>,
    remote_user: Mutex<Option<User>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeAuthProvider {
    pub fn signed_out() -> Self {
        Self {
            session: Mutex::new(None),
            listeners: EventBus::new(),
            failures: Mutex::new(Failures::default()),
            gate: None,
            sign_up_confirmed: Mutex::new(false),
            remote_user: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn signed_in(session: Session) -> Self {
        let provider = Self::signed_out();
        *provider.session.lock().unwrap() = Some(session);
        provider
    }

    /// `get_session` waits for the gate before answering with the session
    /// it saw when called
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn fail_get_session(&self, message: &str) {
        self.failures.lock().unwrap().get_session = Some(message.to_string());
    }

    pub fn fail_get_user(&self, message: &str) {
        self.failures.lock().unwrap().get_user = Some(message.to_string());
    }

    /// `get_user` answers with this user instead of the session's copy,
    /// as after a metadata update made elsewhere
    pub fn set_remote_user(&self, user: User) {
        *self.remote_user.lock().unwrap() = Some(user);
    }

    pub fn fail_sign_in(&self, status: u16, message: &str) {
        self.failures.lock().unwrap().sign_in = Some((status, message.to_string()));
    }

    pub fn fail_sign_out(&self, message: &str) {
        self.failures.lock().unwrap().sign_out = Some(message.to_string());
    }

    /// Make sign-up answer with a session, as with auto-confirm
    pub fn confirm_sign_ups(&self) {
        *self.sign_up_confirmed.lock().unwrap() = true;
    }

    pub fn emit(&self, change: AuthChangeEvent, session: Option<Session>) {
        *self.session.lock().unwrap() = session.clone();
        self.listeners.emit(ProviderAuthEvent::new(change, session));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.subscriber_count::<ProviderAuthEvent>()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn get_session(&self) -> AppResult<Option<Session>> {
        self.record("get_session");
        let snapshot = self.session.lock().unwrap().clone();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(message) = self.failures.lock().unwrap().get_session.clone() {
            return Err(AppError::Other(message));
        }
        Ok(snapshot)
    }

    async fn refresh_session(&self) -> AppResult<Session> {
        self.record("refresh_session");
        let current = self
            .session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::auth(401, "Auth session missing!"))?;
        let refreshed = fake_session(current.user);
        self.emit(AuthChangeEvent::TokenRefreshed, Some(refreshed.clone()));
        Ok(refreshed)
    }

    async fn get_user(&self) -> AppResult<Option<User>> {
        self.record("get_user");
        if let Some(message) = self.failures.lock().unwrap().get_user.clone() {
            return Err(AppError::auth(401, message));
        }
        if let Some(user) = self.remote_user.lock().unwrap().clone() {
            return Ok(Some(user));
        }
        Ok(self.session.lock().unwrap().as_ref().map(|s| s.user.clone()))
    }

    async fn sign_up(&self, request: SignUpRequest) -> AppResult<SignUpOutcome> {
        self.record(format!("sign_up:{}", request.email));
        let mut user = fake_user(&request.email);
        user.user_metadata.username = Some(request.username);

        if *self.sign_up_confirmed.lock().unwrap() {
            let session = fake_session(user.clone());
            self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
            Ok(SignUpOutcome {
                user: Some(user),
                session: Some(session),
            })
        } else {
            user.email_confirmed_at = None;
            Ok(SignUpOutcome {
                user: Some(user),
                session: None,
            })
        }
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> AppResult<Session> {
        self.record(format!("sign_in:{}", email));
        if let Some((status, message)) = self.failures.lock().unwrap().sign_in.clone() {
            return Err(AppError::auth(status, message));
        }
        let session = fake_session(fake_user(email));
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AppResult<String> {
        self.record(format!("oauth:{}", provider));
        Ok(format!(
            "https://auth.example/authorize?provider={}&redirect_to={}",
            provider, redirect_to
        ))
    }

    async fn exchange_code_for_session(&self, auth_code: &str) -> AppResult<Session> {
        self.record(format!("exchange:{}", auth_code));
        let session = fake_session(fake_user("oauth@example.com"));
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.record("sign_out");
        if let Some(message) = self.failures.lock().unwrap().sign_out.clone() {
            return Err(AppError::Other(message));
        }
        self.emit(AuthChangeEvent::SignedOut, None);
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()> {
        self.record(format!("reset:{}:{}", email, redirect_to));
        Ok(())
    }

    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
        self.listeners
            .subscribe::<ProviderAuthEvent, _>(move |event| {
                callback(event.change, event.session.clone())
            })
    }
}

// ============================================================================
// CHANGE FEED
// ============================================================================

/// Change feed driven by hand from the test
#[derive(Default)]
pub struct ManualChangeFeed {
    subscribers: Arc<Mutex<Vec<(u64, ChangeFilter, ChangeCallback)>>>,
    next_id: Mutex<u64>,
}

impl ManualChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, user_id: Uuid, kind: ChangeKind) {
        let targets: Vec<(ChangeFilter, ChangeCallback)> = self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, filter, _)| filter.user_id == user_id)
            .map(|(_, filter, cb)| (filter.clone(), Arc::clone(cb)))
            .collect();

        for (filter, callback) in targets {
            callback(RowChange {
                table: filter.table,
                kind,
                row_id: Uuid::new_v4(),
            });
        }
    }

    pub fn subscriber_filters(&self) -> Vec<ChangeFilter> {
        self.subscribers
            .lock()
            .unwrap()
            .iter()
            .map(|(_, filter, _)| filter.clone())
            .collect()
    }
}

impl ChangeFeed for ManualChangeFeed {
    fn subscribe(&self, filter: ChangeFilter, on_change: ChangeCallback) -> FeedSubscription {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.subscribers.lock().unwrap().push((id, filter, on_change));

        let subscribers = Arc::clone(&self.subscribers);
        FeedSubscription::from_fn(move || {
            subscribers.lock().unwrap().retain(|(sid, _, _)| *sid != id);
        })
    }
}
