// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod movie;
pub mod route;
pub mod search;
pub mod session;
pub mod statistics;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Movie Domain
pub use movie::{
    filter_favorites, validate_new_movie, validate_rating, MovieRecord, NewMovieRecord,
    MAX_RATING,
};

// Session Domain
pub use session::{AuthChangeEvent, Session, User, UserMetadata};

// Metadata Search
pub use search::{MovieDetails, SearchCandidate, MIN_QUERY_CHARS};

// Routing
pub use route::{Location, Route, RouteMatch, DASHBOARD_PATH, SIGN_IN_PATH};

// Statistics (Derived Data)
pub use statistics::{DashboardStats, ProfileSummary};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Rating {0} is outside 1-5")]
    InvalidRating(u8),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
