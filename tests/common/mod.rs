// tests/common/mod.rs
//
// In-memory adapters for end-to-end flows through AppState

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use movie_journal::application::AppState;
use movie_journal::config::AppConfig;
use movie_journal::domain::{
    AuthChangeEvent, MovieDetails, MovieRecord, NewMovieRecord, SearchCandidate, Session, User,
    UserMetadata,
};
use movie_journal::error::{AppError, AppResult};
use movie_journal::events::{EventBus, Notification, NotificationRaised, ProviderAuthEvent, Subscription};
use movie_journal::integrations::{
    AuthProvider, AuthStateCallback, ChangeCallback, ChangeFeed, ChangeFilter, FeedSubscription,
    MetadataClient, OAuthProvider, SignUpOutcome, SignUpRequest,
};
use movie_journal::repositories::MovieRepository;

pub fn session_for(email: &str) -> Session {
    let user = User {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
        email_confirmed_at: Some(Utc::now()),
        created_at: Some(Utc::now()),
        user_metadata: UserMetadata {
            username: Some("cinephile".to_string()),
            ..Default::default()
        },
    };
    Session {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: Some(Utc::now().timestamp() + 3600),
        user,
    }
}

// ============================================================================
// AUTH
// ============================================================================

/// Accepts one known email/password pair
pub struct MemoryAuth {
    session: Mutex<Option<Session>>,
    account: (String, String),
    listeners: EventBus,
}

impl MemoryAuth {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            session: Mutex::new(None),
            account: (email.to_string(), password.to_string()),
            listeners: EventBus::new(),
        }
    }

    pub fn signed_in(email: &str, password: &str) -> Self {
        let auth = Self::new(email, password);
        *auth.session.lock().unwrap() = Some(session_for(email));
        auth
    }

    fn commit(&self, change: AuthChangeEvent, session: Option<Session>) {
        *self.session.lock().unwrap() = session.clone();
        self.listeners.emit(ProviderAuthEvent::new(change, session));
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn get_session(&self) -> AppResult<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn refresh_session(&self) -> AppResult<Session> {
        let mut session = self
            .session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::auth(401, "Auth session missing!"))?;
        session.expires_at = Some(Utc::now().timestamp() + 3600);
        self.commit(AuthChangeEvent::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }

    async fn get_user(&self) -> AppResult<Option<User>> {
        Ok(self.session.lock().unwrap().as_ref().map(|s| s.user.clone()))
    }

    async fn sign_up(&self, request: SignUpRequest) -> AppResult<SignUpOutcome> {
        if request.email == self.account.0 {
            return Err(AppError::auth(422, "User already registered"));
        }
        let mut session = session_for(&request.email);
        session.user.email_confirmed_at = None;
        Ok(SignUpOutcome {
            user: Some(session.user),
            session: None,
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        if (email, password) != (self.account.0.as_str(), self.account.1.as_str()) {
            return Err(AppError::auth(400, "Invalid login credentials"));
        }
        let session = session_for(email);
        self.commit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AppResult<String> {
        Ok(format!("https://auth.test/authorize?provider={}&redirect_to={}", provider, redirect_to))
    }

    async fn exchange_code_for_session(&self, _auth_code: &str) -> AppResult<Session> {
        let session = session_for(&self.account.0);
        self.commit(AuthChangeEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.commit(AuthChangeEvent::SignedOut, None);
        Ok(())
    }

    async fn reset_password_for_email(&self, _email: &str, _redirect_to: &str) -> AppResult<()> {
        Ok(())
    }

    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
        self.listeners.subscribe::<ProviderAuthEvent, _>(move |event| {
            callback(event.change, event.session.clone())
        })
    }
}

// ============================================================================
// STORE, FEED, METADATA
// ============================================================================

#[derive(Default)]
pub struct MemoryMovies {
    rows: Mutex<Vec<MovieRecord>>,
}

#[async_trait]
impl MovieRepository for MemoryMovies {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<MovieRecord>> {
        let mut rows: Vec<MovieRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MovieRecord>> {
        Ok(self.rows.lock().unwrap().iter().find(|m| m.id == id).cloned())
    }

    async fn insert(&self, movie: &NewMovieRecord) -> AppResult<MovieRecord> {
        let mut rows = self.rows.lock().unwrap();
        // Keep created_at strictly increasing so ordering is stable
        let created_at = Utc::now() + Duration::milliseconds(rows.len() as i64);
        let record = MovieRecord {
            id: Uuid::new_v4(),
            user_id: movie.user_id,
            title: movie.title.clone(),
            year: movie.year,
            poster: movie.poster.clone(),
            plot: movie.plot.clone(),
            genre: movie.genre.clone(),
            runtime: movie.runtime,
            rating: Some(movie.rating),
            review: movie.review.clone(),
            is_favorite: movie.is_favorite,
            created_at,
            updated_at: created_at,
        };
        rows.push(record.clone());
        Ok(record)
    }
}

/// Never reports changes
pub struct SilentFeed;

impl ChangeFeed for SilentFeed {
    fn subscribe(&self, _filter: ChangeFilter, _on_change: ChangeCallback) -> FeedSubscription {
        FeedSubscription::inert()
    }
}

/// Knows a single title
pub struct GodfatherCatalog {
    pub searches: Mutex<Vec<String>>,
    details_down: Mutex<bool>,
}

impl GodfatherCatalog {
    pub fn new() -> Self {
        Self {
            searches: Mutex::new(Vec::new()),
            details_down: Mutex::new(false),
        }
    }

    /// Make every detail lookup fail from now on
    pub fn break_details(&self) {
        *self.details_down.lock().unwrap() = true;
    }
}

#[async_trait]
impl MetadataClient for GodfatherCatalog {
    async fn search(&self, query: &str) -> AppResult<Vec<SearchCandidate>> {
        self.searches.lock().unwrap().push(query.to_string());
        if !"the godfather".contains(&query.to_lowercase()) {
            return Ok(Vec::new());
        }
        Ok(vec![SearchCandidate {
            id: "tt0068646".to_string(),
            title: "The Godfather".to_string(),
            year: "1972".to_string(),
            kind: "movie".to_string(),
            poster: None,
        }])
    }

    async fn details(&self, id: &str) -> AppResult<MovieDetails> {
        if *self.details_down.lock().unwrap() {
            return Err(AppError::api(503, "Service Unavailable"));
        }
        if id != "tt0068646" {
            return Err(AppError::NotFound);
        }
        Ok(MovieDetails {
            id: id.to_string(),
            title: "The Godfather".to_string(),
            year: Some(1972),
            poster: None,
            plot: Some("The aging patriarch of an organized crime dynasty...".to_string()),
            genre: Some("Crime, Drama".to_string()),
            runtime: Some(175),
            director: Some("Francis Ford Coppola".to_string()),
            actors: None,
            rated: Some("R".to_string()),
        })
    }
}

// ============================================================================
// HARNESS
// ============================================================================

pub struct Harness {
    pub state: AppState,
    pub catalog: Arc<GodfatherCatalog>,
    pub notifications: Arc<Mutex<Vec<Notification>>>,
    _subscription: Subscription,
}

pub async fn start(auth: MemoryAuth) -> Harness {
    let catalog = Arc::new(GodfatherCatalog::new());
    let state = AppState::new(
        AppConfig::default(),
        Arc::new(auth),
        Arc::new(MemoryMovies::default()),
        Arc::new(SilentFeed),
        catalog.clone(),
    );

    let notifications = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&notifications);
    let subscription = state
        .event_bus
        .subscribe::<NotificationRaised, _>(move |event| {
            sink.lock().unwrap().push(event.notification.clone());
        });

    state.start().await;

    Harness {
        state,
        catalog,
        notifications,
        _subscription: subscription,
    }
}

impl Harness {
    pub fn titles(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }
}
