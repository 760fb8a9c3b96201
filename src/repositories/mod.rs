// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO invariant enforcement
// - NO event emission
// - NO cross-repository calls

pub mod local_storage;
pub mod movie_repository;

pub use local_storage::{LocalStorage, SqliteLocalStorage};
pub use movie_repository::{MovieRepository, SupabaseMovieRepository, MOVIES_TABLE};

#[cfg(test)]
pub use movie_repository::MockMovieRepository;
