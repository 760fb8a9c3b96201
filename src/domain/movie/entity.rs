use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::search::MovieDetails;

/// Highest star rating a review can carry
pub const MAX_RATING: u8 = 5;

/// A movie the user has watched and reviewed
/// Records are owned by exactly one user and are never edited after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Store-assigned identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub title: String,

    /// Release year (if known)
    pub year: Option<i32>,

    /// Poster image URL
    pub poster: Option<String>,

    /// Plot summary
    pub plot: Option<String>,

    /// Comma separated genres as returned by the metadata API
    pub genre: Option<String>,

    /// Runtime in minutes
    pub runtime: Option<u32>,

    /// User rating, 1 to 5 stars
    pub rating: Option<u8>,

    /// Free-text review
    pub review: Option<String>,

    /// Marked for the favorites view
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new movie record.
/// Identifier and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovieRecord {
    pub user_id: Uuid,
    pub title: String,
    pub year: Option<i32>,
    pub poster: Option<String>,
    pub plot: Option<String>,
    pub genre: Option<String>,
    pub runtime: Option<u32>,
    pub rating: u8,
    pub review: Option<String>,
    pub is_favorite: bool,
}

impl NewMovieRecord {
    /// Combine looked-up metadata with the user's own verdict
    pub fn compose(
        user_id: Uuid,
        details: &MovieDetails,
        rating: u8,
        review: &str,
        is_favorite: bool,
    ) -> Self {
        let review = review.trim();
        Self {
            user_id,
            title: details.title.clone(),
            year: details.year,
            poster: details.poster.clone(),
            plot: details.plot.clone(),
            genre: details.genre.clone(),
            runtime: details.runtime,
            rating,
            review: if review.is_empty() {
                None
            } else {
                Some(review.to_string())
            },
            is_favorite,
        }
    }
}

/// Records flagged as favorite, in their original order
pub fn filter_favorites(movies: &[MovieRecord]) -> Vec<MovieRecord> {
    movies.iter().filter(|m| m.is_favorite).cloned().collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl std::fmt::Display for MovieRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}
