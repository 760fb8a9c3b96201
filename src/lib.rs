// src/lib.rs
// Movie Journal - client core for a personal movie journal
//
// Architecture:
// - Domain-centric: records, sessions, routes and derived stats live in domain/
// - Event-driven: services announce state changes on the EventBus
// - Explicit: every remote collaborator is a trait handed in as Arc<dyn Trait>
// - Hosted backend: auth and movie records live behind REST APIs; only the
//   session and the PKCE verifier are kept locally (SQLite)
// - Application Layer: UI boundary (commands + DTOs)

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    filter_favorites,
    validate_new_movie,
    validate_rating,
    // Session
    AuthChangeEvent,
    // Statistics
    DashboardStats,
    // Routing
    Location,
    // Search
    MovieDetails,
    // Movies
    MovieRecord,
    NewMovieRecord,
    ProfileSummary,
    Route,
    RouteMatch,
    SearchCandidate,
    Session,
    User,
    UserMetadata,
};

// ============================================================================
// PUBLIC API - Configuration & Errors
// ============================================================================

pub use config::AppConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    AuthStateChanged,
    DomainEvent,
    EventBus,
    EventLogEntry,
    MovieSaved,
    MoviesFetched,
    Notification,
    NotificationRaised,
    Subscription,
};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    LocalStorage,
    MovieRepository,
    SqliteLocalStorage,
    SupabaseMovieRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    AuthFormService,
    DashboardService,
    Debouncer,
    FormOutcome,
    MovieCollection,
    MovieSearchPanel,
    Navigator,
    ReviewSubmissionForm,
    SessionState,
    SessionStore,
    SubmitOutcome,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;

// Re-export application submodules
pub use application::commands;
pub use application::dto;

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{
    AuthProvider,
    ChangeFeed,
    MetadataClient,
    OmdbClient,
    PollingChangeFeed,
    SupabaseAuthClient,
};
