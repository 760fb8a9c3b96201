// src/application/commands/auth_commands.rs
//
// Auth Command Handlers
//
// RULES:
// - Accept DTOs
// - Call services
// - Return DTOs
// - Never contain business logic

use crate::application::{dto::*, state::AppState};
use crate::domain::Location;
use crate::events::{Notification, NotificationRaised};
use crate::services::{FormOutcome, SignInForm, SignOutOutcome, SignUpForm};

/// Current session as the UI sees it
pub async fn get_session(state: &AppState) -> Result<SessionDto, String> {
    Ok(SessionDto::from(state.sessions.state()))
}

pub async fn sign_up(state: &AppState, dto: SignUpDto) -> Result<FormOutcome, String> {
    let form = SignUpForm {
        email: dto.email,
        password: dto.password,
        confirm_password: dto.confirm_password,
        username: dto.username,
    };
    Ok(follow(state, state.auth_forms.sign_up(form).await))
}

pub async fn sign_in(state: &AppState, dto: SignInDto) -> Result<FormOutcome, String> {
    let form = SignInForm {
        email: dto.email,
        password: dto.password,
    };
    Ok(follow(state, state.auth_forms.sign_in(form).await))
}

/// Start Google sign-in; the outcome carries the URL to open
pub async fn sign_in_with_google(state: &AppState) -> Result<FormOutcome, String> {
    Ok(state.auth_forms.sign_in_with_google().await)
}

/// Finish an OAuth flow from the URL (or path) the provider redirected to
pub async fn complete_oauth(state: &AppState, callback: String) -> Result<FormOutcome, String> {
    let raw = match url::Url::parse(&callback) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => callback,
    };
    let location = Location::parse(&raw);
    Ok(follow(state, state.auth_forms.complete_oauth(&location).await))
}

pub async fn request_password_reset(state: &AppState, email: String) -> Result<FormOutcome, String> {
    Ok(state.auth_forms.request_password_reset(&email).await)
}

/// Sign out and go to the landing page
pub async fn sign_out(state: &AppState) -> Result<NavigationDto, String> {
    match state.sessions.sign_out().await {
        SignOutOutcome::SignedOut => {
            state.event_bus.emit(NotificationRaised::new(Notification::info(
                "Signed out successfully",
                "You have been signed out of your account.",
            )));
            let outcome = state.navigator.navigate("/", &state.sessions.state());
            Ok(NavigationDto::from(outcome))
        }
        SignOutOutcome::Failed(message) => {
            let description = if message.trim().is_empty() {
                "Failed to sign out".to_string()
            } else {
                message
            };
            state
                .event_bus
                .emit(NotificationRaised::new(Notification::error("Error", description.clone())));
            Err(description)
        }
    }
}

/// Apply an in-app navigation outcome to the navigator
fn follow(state: &AppState, outcome: FormOutcome) -> FormOutcome {
    match outcome {
        FormOutcome::Navigate(location) => {
            let settled = state
                .navigator
                .navigate(&location.to_string(), &state.sessions.state());
            FormOutcome::Navigate(settled.location)
        }
        other => other,
    }
}
