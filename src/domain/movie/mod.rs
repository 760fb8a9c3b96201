pub mod entity;
pub mod invariants;

pub use entity::{filter_favorites, MovieRecord, NewMovieRecord, MAX_RATING};
pub use invariants::{validate_new_movie, validate_rating};
