// src/application/commands/search_commands.rs
//
// Search Command Handlers
//
// Typing is fire-and-forget: results land in the panel state once the
// debounce window has passed.

use crate::application::error_handling::ToErrorResponse;
use crate::application::state::AppState;
use crate::domain::MovieDetails;
use crate::services::SearchState;

pub async fn search_input(state: &AppState, text: String) -> Result<(), String> {
    state.search.on_input(&text);
    Ok(())
}

pub async fn get_search_state(state: &AppState) -> Result<SearchState, String> {
    Ok(state.search.state())
}

/// Load a candidate's details and make it the movie under review.
/// The previous movie is dropped first, so a failed lookup leaves nothing
/// to submit.
pub async fn select_search_result(
    state: &AppState,
    candidate_id: String,
) -> Result<MovieDetails, String> {
    state.review_form.clear_movie();
    let details = state.search.select(&candidate_id).await.to_error_response()?;
    state.review_form.select_movie(details.clone());
    Ok(details)
}

pub async fn clear_search(state: &AppState) -> Result<(), String> {
    state.search.clear();
    Ok(())
}
