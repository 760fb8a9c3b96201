// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - DTOs NEVER leak tokens or other credentials
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::domain::statistics::display_name;
use crate::domain::{DashboardStats, MovieRecord, ProfileSummary, User};
use crate::services::{NavigationOutcome, Screen, SessionState};

// ============================================================================
// SESSION DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub display_name: String,
    pub email_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDto {
    pub loading: bool,
    pub authenticated: bool,
    pub user: Option<UserDto>,
    /// RFC 3339
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpDto {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInDto {
    pub email: String,
    pub password: String,
}

// ============================================================================
// MOVIE DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDto {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub poster: Option<String>,
    pub plot: Option<String>,
    pub genre: Option<String>,
    pub runtime: Option<u32>,
    pub rating: Option<u8>,
    pub review: Option<String>,
    pub is_favorite: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDto {
    pub rating: u8,
    pub review: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardDto {
    pub loading: bool,
    pub stats: DashboardStats,
    /// "Watched" tab, newest first
    pub movies: Vec<MovieDto>,
    pub favorites: Vec<MovieDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDto {
    pub display_name: String,
    pub initials: String,
    pub avatar_url: Option<String>,
    pub joined_at: Option<String>,
    pub total_movies: usize,
    pub favorite_movies: usize,
    pub average_rating: f64,
    pub recent_activity: Vec<MovieDto>,
}

// ============================================================================
// NAVIGATION DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationDto {
    pub path: String,
    pub query: Option<String>,
    /// Route name, or "loading" while the session resolves
    pub screen: String,
    pub redirected_from: Option<String>,
}

// ============================================================================
// CONVERSIONS (Domain → DTO)
// ============================================================================

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            username: user.user_metadata.username.clone(),
            display_name: display_name(user),
            email_confirmed: user.is_email_confirmed(),
        }
    }
}

impl From<SessionState> for SessionDto {
    fn from(state: SessionState) -> Self {
        Self {
            loading: state.loading,
            authenticated: state.is_authenticated(),
            user: state.user.as_ref().map(UserDto::from),
            expires_at: state
                .session
                .as_ref()
                .and_then(|s| s.expires_at())
                .map(|at| at.to_rfc3339()),
        }
    }
}

impl From<MovieRecord> for MovieDto {
    fn from(movie: MovieRecord) -> Self {
        Self {
            id: movie.id.to_string(),
            title: movie.title,
            year: movie.year,
            poster: movie.poster,
            plot: movie.plot,
            genre: movie.genre,
            runtime: movie.runtime,
            rating: movie.rating,
            review: movie.review,
            is_favorite: movie.is_favorite,
            created_at: movie.created_at.to_rfc3339(),
        }
    }
}

impl From<ProfileSummary> for ProfileDto {
    fn from(summary: ProfileSummary) -> Self {
        Self {
            display_name: summary.display_name,
            initials: summary.initials,
            avatar_url: summary.avatar_url,
            joined_at: summary.joined_at.map(|at| at.to_rfc3339()),
            total_movies: summary.total_movies,
            favorite_movies: summary.favorite_movies,
            average_rating: summary.average_rating,
            recent_activity: summary
                .recent_activity
                .into_iter()
                .map(MovieDto::from)
                .collect(),
        }
    }
}

impl From<NavigationOutcome> for NavigationDto {
    fn from(outcome: NavigationOutcome) -> Self {
        let screen = match &outcome.screen {
            Screen::Loading => "loading".to_string(),
            Screen::Page(route) => route.name().to_string(),
        };
        Self {
            path: outcome.location.path.clone(),
            query: outcome.location.query.clone(),
            screen,
            redirected_from: outcome.redirected_from.map(|from| from.to_string()),
        }
    }
}
