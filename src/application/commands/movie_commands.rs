// src/application/commands/movie_commands.rs
//
// Movie Command Handlers
//
// RULES:
// - Accept DTOs
// - Call services
// - Return DTOs
// - Never contain business logic

use uuid::Uuid;

use crate::application::error_handling::ToErrorResponse;
use crate::application::{dto::*, state::AppState};
use crate::domain::DashboardStats;
use crate::services::{ReviewFormState, SubmitOutcome};

/// Stats plus both dashboard tabs
pub async fn get_dashboard(state: &AppState) -> Result<DashboardDto, String> {
    let collection = state.collection.state();
    Ok(DashboardDto {
        loading: collection.loading,
        stats: DashboardStats::from_movies(&collection.movies),
        movies: collection.movies.into_iter().map(MovieDto::from).collect(),
        favorites: collection
            .favorite_movies
            .into_iter()
            .map(MovieDto::from)
            .collect(),
    })
}

pub async fn list_movies(state: &AppState) -> Result<Vec<MovieDto>, String> {
    Ok(state
        .collection
        .movies()
        .into_iter()
        .map(MovieDto::from)
        .collect())
}

pub async fn list_favorites(state: &AppState) -> Result<Vec<MovieDto>, String> {
    Ok(state
        .collection
        .favorite_movies()
        .into_iter()
        .map(MovieDto::from)
        .collect())
}

/// Get a single movie by ID
pub async fn get_movie(state: &AppState, movie_id: String) -> Result<MovieDto, String> {
    let id = Uuid::parse_str(&movie_id).map_err(|e| format!("Invalid UUID: {}", e))?;

    let movie = state.dashboard.movie_detail(id).await.to_error_response()?;
    Ok(MovieDto::from(movie))
}

pub async fn get_profile(state: &AppState) -> Result<ProfileDto, String> {
    let summary = state.dashboard.profile().await.to_error_response()?;
    Ok(ProfileDto::from(summary))
}

/// Force a reload of the signed-in user's movies
pub async fn refresh_movies(state: &AppState) -> Result<(), String> {
    state.collection.refetch().await;
    Ok(())
}

pub async fn get_review_form(state: &AppState) -> Result<ReviewFormState, String> {
    Ok(state.review_form.state())
}

/// Fill in the review for the selected movie and submit it
pub async fn submit_review(state: &AppState, dto: ReviewDto) -> Result<SubmitOutcome, String> {
    state.review_form.set_rating(dto.rating);
    state.review_form.set_review(&dto.review);
    state.review_form.set_favorite(dto.is_favorite);

    let outcome = state.review_form.submit().await;

    if let SubmitOutcome::Saved { navigate_to, .. } = &outcome {
        state.collection.refetch().await;
        state
            .navigator
            .navigate(&navigate_to.to_string(), &state.sessions.state());
    }

    Ok(outcome)
}

/// Drop the selected movie and any review typed for it
pub async fn cancel_review(state: &AppState) -> Result<(), String> {
    state.review_form.cancel();
    state.search.clear();
    Ok(())
}
