use super::entity::{NewMovieRecord, MAX_RATING};
use crate::domain::{DomainError, DomainResult};

/// Validates a record before it is sent to the store
pub fn validate_new_movie(movie: &NewMovieRecord) -> DomainResult<()> {
    validate_title(&movie.title)?;
    validate_rating(movie.rating)?;
    Ok(())
}

/// A rating of 0 means "not rated yet" and can never be stored
pub fn validate_rating(rating: u8) -> DomainResult<()> {
    if rating == 0 || rating > MAX_RATING {
        return Err(DomainError::InvalidRating(rating));
    }
    Ok(())
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Movie title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Invariants that must hold for movie records:
///
/// 1. Every record belongs to exactly one user
/// 2. Rating is between 1 and 5 inclusive
/// 3. Title cannot be empty
/// 4. Records are immutable once stored
