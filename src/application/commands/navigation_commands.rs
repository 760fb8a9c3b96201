// src/application/commands/navigation_commands.rs

use crate::application::{dto::NavigationDto, state::AppState};

/// Move to `path`, passing through legacy rewrites and the auth gate
pub async fn navigate(state: &AppState, path: String) -> Result<NavigationDto, String> {
    let outcome = state.navigator.navigate(&path, &state.sessions.state());
    Ok(NavigationDto::from(outcome))
}

/// Re-evaluate where the client is, e.g. after the session resolved
pub async fn current_location(state: &AppState) -> Result<NavigationDto, String> {
    let outcome = state.navigator.refresh(&state.sessions.state());
    Ok(NavigationDto::from(outcome))
}
