// src/integrations/auth_provider.rs
//
// Auth provider seam
//
// Everything the client needs from the hosted identity service. Services
// hold an `Arc<dyn AuthProvider>` so tests can substitute an in-memory fake.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AuthChangeEvent, Session, User};
use crate::error::AppResult;
use crate::events::Subscription;

/// Listener for provider auth transitions
pub type AuthStateCallback = Arc<dyn Fn(AuthChangeEvent, Option<Session>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OAuthProvider::Google => write!(f, "google"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    /// Where the confirmation email should send the user back to
    pub email_redirect_to: String,
}

/// What the provider returned for a sign-up.
///
/// `session` is present only when the project confirms emails automatically.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The persisted session, refreshed first when it is about to expire
    async fn get_session(&self) -> AppResult<Option<Session>>;

    async fn refresh_session(&self) -> AppResult<Session>;

    /// The user as the provider currently knows it (fresh metadata), if signed in
    async fn get_user(&self) -> AppResult<Option<User>>;

    async fn sign_up(&self, request: SignUpRequest) -> AppResult<SignUpOutcome>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session>;

    /// Prepare a PKCE flow and return the provider URL the user must visit
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AppResult<String>;

    /// Finish a PKCE flow with the `code` from the callback URL
    async fn exchange_code_for_session(&self, auth_code: &str) -> AppResult<Session>;

    async fn sign_out(&self) -> AppResult<()>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()>;

    /// Register a listener; it stays registered while the handle lives
    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription;
}
