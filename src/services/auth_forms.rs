// src/services/auth_forms.rs
//
// Auth Forms - sign-up, sign-in, OAuth and password reset flows
//
// Each flow validates locally first, calls the provider, then reports the
// result as a notification plus where the client should go next.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::{Location, DASHBOARD_PATH, SIGN_IN_PATH};
use crate::error::AppError;
use crate::events::{EventBus, Notification, NotificationRaised};
use crate::integrations::{AuthProvider, OAuthProvider, SignUpRequest};
use crate::services::navigation::Navigator;

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Reset links land here
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub username: String,
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Where the client goes after a form was submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "next", content = "target", rename_all = "snake_case")]
pub enum FormOutcome {
    /// Stay on the form (validation or provider error)
    Stay,
    Navigate(Location),
    /// Leave the client for the provider (OAuth)
    External(String),
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

/// First local problem with a sign-up form, as a notification
pub fn validate_sign_up(form: &SignUpForm) -> Result<(), Notification> {
    if form.password != form.confirm_password {
        return Err(Notification::error(
            "Password Mismatch",
            "Passwords do not match. Please try again.",
        ));
    }
    if form.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(Notification::error(
            "Password Too Short",
            "Password must be at least 6 characters long.",
        ));
    }
    if !is_valid_email(&form.email) {
        return Err(Notification::error(
            "Invalid Email",
            "Please enter a valid email address.",
        ));
    }
    Ok(())
}

/// User-facing text for a provider error message
pub fn map_auth_error(message: &str) -> String {
    if message.contains("Invalid login credentials") {
        "Invalid email or password. Please check your credentials.".to_string()
    } else if message.contains("Email not confirmed") {
        "Please check your email and confirm your account.".to_string()
    } else if message.contains("Too many requests") {
        "Too many attempts. Please wait a moment and try again.".to_string()
    } else if message.contains("User already registered") {
        "An account with this email already exists. Please sign in instead.".to_string()
    } else if message.contains("Password should be at least 6 characters") {
        "Password must be at least 6 characters long.".to_string()
    } else if message.contains("Invalid email") {
        "Please enter a valid email address.".to_string()
    } else if message.trim().is_empty() {
        "An unexpected error occurred. Please try again.".to_string()
    } else {
        message.to_string()
    }
}

pub struct AuthFormService {
    auth: Arc<dyn AuthProvider>,
    navigator: Arc<Navigator>,
    event_bus: Arc<EventBus>,
    config: Arc<AppConfig>,
}

impl AuthFormService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        navigator: Arc<Navigator>,
        event_bus: Arc<EventBus>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            auth,
            navigator,
            event_bus,
            config,
        }
    }

    fn notify(&self, notification: Notification) {
        self.event_bus.emit(NotificationRaised::new(notification));
    }

    fn fail(&self, title: &str, error: &AppError) -> FormOutcome {
        log::error!("{}: {}", title, error);
        self.notify(Notification::error(title, map_auth_error(&error.to_string())));
        FormOutcome::Stay
    }

    pub async fn sign_up(&self, form: SignUpForm) -> FormOutcome {
        if let Err(notification) = validate_sign_up(&form) {
            self.notify(notification);
            return FormOutcome::Stay;
        }

        let request = SignUpRequest {
            email: form.email.trim().to_string(),
            password: form.password,
            username: form.username.trim().to_string(),
            email_redirect_to: self.config.site_path(DASHBOARD_PATH),
        };

        let outcome = match self.auth.sign_up(request).await {
            Ok(outcome) => outcome,
            Err(e) => return self.fail("Sign Up Failed", &e),
        };

        let confirmed = outcome.session.is_some()
            || outcome.user.as_ref().is_some_and(|u| u.is_email_confirmed());

        if confirmed {
            self.notify(Notification::info(
                "Account Created!",
                "Welcome! You have been signed up successfully.",
            ));
            FormOutcome::Navigate(Location::new(DASHBOARD_PATH))
        } else {
            self.notify(Notification::info(
                "Check Your Email",
                "Please check your email and click the confirmation link to complete your registration.",
            ));
            FormOutcome::Navigate(Location::new(SIGN_IN_PATH))
        }
    }

    /// On success go back to the page the sign-in interrupted, else the dashboard
    pub async fn sign_in(&self, form: SignInForm) -> FormOutcome {
        if !is_valid_email(&form.email) || form.password.is_empty() {
            self.notify(Notification::error(
                "Sign In Failed",
                "Please enter your email and password.",
            ));
            return FormOutcome::Stay;
        }

        match self
            .auth
            .sign_in_with_password(form.email.trim(), &form.password)
            .await
        {
            Ok(_) => {
                self.notify(Notification::info("Welcome back!", "You have been signed in."));
                let target = self
                    .navigator
                    .take_return_to()
                    .unwrap_or_else(|| Location::new(DASHBOARD_PATH));
                FormOutcome::Navigate(target)
            }
            Err(e) => self.fail("Sign In Failed", &e),
        }
    }

    pub async fn sign_in_with_google(&self) -> FormOutcome {
        match self
            .auth
            .sign_in_with_oauth(OAuthProvider::Google, &self.config.site_path(DASHBOARD_PATH))
            .await
        {
            Ok(url) => FormOutcome::External(url),
            Err(e) => self.fail("Google Sign In Failed", &e),
        }
    }

    /// Handle the location the OAuth provider redirected back to
    pub async fn complete_oauth(&self, callback: &Location) -> FormOutcome {
        let params: Vec<(String, String)> = callback
            .query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        let param = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        if let Some(error) = param("error") {
            let description = param("error_description").unwrap_or(error);
            self.notify(Notification::error("Google Sign In Failed", description));
            return FormOutcome::Navigate(Location::new(SIGN_IN_PATH));
        }

        let Some(code) = param("code") else {
            return FormOutcome::Stay;
        };

        match self.auth.exchange_code_for_session(&code).await {
            Ok(_) => FormOutcome::Navigate(Location::new(callback.path.clone())),
            Err(e) => {
                self.fail("Google Sign In Failed", &e);
                FormOutcome::Navigate(Location::new(SIGN_IN_PATH))
            }
        }
    }

    pub async fn request_password_reset(&self, email: &str) -> FormOutcome {
        if !is_valid_email(email) {
            self.notify(Notification::error(
                "Error",
                "Please enter a valid email address.",
            ));
            return FormOutcome::Stay;
        }

        let redirect_to = self.config.site_path(RESET_PASSWORD_PATH);
        match self
            .auth
            .reset_password_for_email(email.trim(), &redirect_to)
            .await
        {
            Ok(()) => {
                self.notify(Notification::info(
                    "Reset link sent!",
                    "Check your email for a password reset link.",
                ));
                FormOutcome::Stay
            }
            Err(e) => {
                log::error!("Password reset failed: {}", e);
                let message = e.to_string();
                self.notify(Notification::error(
                    "Error",
                    if message.trim().is_empty() {
                        "Failed to send reset email. Please try again.".to_string()
                    } else {
                        message
                    },
                ));
                FormOutcome::Stay
            }
        }
    }
}
