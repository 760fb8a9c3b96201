use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::movie::MovieRecord;
use crate::domain::session::User;

/// Number of movies listed under "Recent Activity"
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Headline numbers shown above the dashboard tabs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_movies: usize,
    /// Mean rating rounded to one decimal; unrated movies count as 0
    pub average_rating: f64,
    /// Whole hours of runtime across all movies
    pub total_hours: u64,
    pub favorite_count: usize,
}

impl DashboardStats {
    pub fn from_movies(movies: &[MovieRecord]) -> Self {
        let total_minutes: u64 = movies
            .iter()
            .filter_map(|m| m.runtime)
            .map(u64::from)
            .sum();

        Self {
            total_movies: movies.len(),
            average_rating: average_rating(movies),
            total_hours: total_minutes / 60,
            favorite_count: movies.iter().filter(|m| m.is_favorite).count(),
        }
    }
}

/// Identity block and totals for the profile page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub display_name: String,
    pub initials: String,
    pub avatar_url: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
    pub total_movies: usize,
    pub favorite_movies: usize,
    pub average_rating: f64,
    pub recent_activity: Vec<MovieRecord>,
}

impl ProfileSummary {
    pub fn build(user: &User, movies: &[MovieRecord]) -> Self {
        Self {
            display_name: display_name(user),
            initials: initials(user),
            avatar_url: user.user_metadata.avatar_url.clone(),
            joined_at: user.created_at,
            total_movies: movies.len(),
            favorite_movies: movies.iter().filter(|m| m.is_favorite).count(),
            average_rating: average_rating(movies),
            recent_activity: movies.iter().take(RECENT_ACTIVITY_LIMIT).cloned().collect(),
        }
    }
}

/// username, then full name, then email, then "User"
pub fn display_name(user: &User) -> String {
    let meta = &user.user_metadata;
    [&meta.username, &meta.full_name, &user.email]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| "User".to_string())
}

/// First letter of the username or email, upper-cased
pub fn initials(user: &User) -> String {
    [&user.user_metadata.username, &user.email]
        .into_iter()
        .flatten()
        .find_map(|s| s.trim().chars().next())
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_else(|| "U".to_string())
}

fn average_rating(movies: &[MovieRecord]) -> f64 {
    if movies.is_empty() {
        return 0.0;
    }
    let sum: u32 = movies.iter().map(|m| m.rating.unwrap_or(0) as u32).sum();
    let mean = sum as f64 / movies.len() as f64;
    (mean * 10.0).round() / 10.0
}
