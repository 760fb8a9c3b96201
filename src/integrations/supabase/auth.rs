// src/integrations/supabase/auth.rs
//
// GoTrue auth client
//
// ARCHITECTURE:
// - Session persisted as JSON in local storage under the configured key
// - Listeners receive every transition through a private event bus
// - A background task refreshes the access token shortly before expiry
//
// CRITICAL RULES:
// - Every successful sign-in path goes through `commit`
// - SIGNED_OUT always removes the persisted session

use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use url::Url;

use super::pkce::{generate_code_challenge, generate_code_verifier, CHALLENGE_METHOD};
use super::{ensure_auth_success, SupabaseHttp};
use crate::config::AppConfig;
use crate::domain::{AuthChangeEvent, Session, User};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, ProviderAuthEvent, Subscription};
use crate::integrations::auth_provider::{
    AuthProvider, AuthStateCallback, OAuthProvider, SignUpOutcome, SignUpRequest,
};
use crate::repositories::LocalStorage;

pub struct SupabaseAuthClient {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    http: SupabaseHttp,
    storage: Arc<dyn LocalStorage>,
    listeners: EventBus,
    storage_key: String,
    verifier_key: String,
    refresh_margin: chrono::Duration,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl SupabaseAuthClient {
    pub fn new(config: &AppConfig, storage: Arc<dyn LocalStorage>) -> AppResult<Self> {
        Ok(Self::with_http(SupabaseHttp::new(config)?, config, storage))
    }

    pub fn with_http(http: SupabaseHttp, config: &AppConfig, storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                http,
                storage,
                listeners: EventBus::new(),
                storage_key: config.storage_key.clone(),
                verifier_key: config.code_verifier_key(),
                refresh_margin: config.refresh_margin(),
                refresh_task: Mutex::new(None),
            }),
        }
    }

    /// Schedule the background refresh for a session restored from storage
    pub fn start_auto_refresh(&self) -> AppResult<()> {
        if let Some(session) = self.inner.load_session()? {
            self.inner.schedule_refresh(&session);
        }
        Ok(())
    }

    pub fn stop_auto_refresh(&self) {
        self.inner.cancel_refresh();
    }
}

impl AuthInner {
    fn load_session(&self) -> AppResult<Option<Session>> {
        let Some(raw) = self.storage.get_item(&self.storage_key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                log::warn!("Discarding unreadable persisted session: {}", e);
                self.storage.remove_item(&self.storage_key)?;
                Ok(None)
            }
        }
    }

    fn notify(&self, change: AuthChangeEvent, session: Option<Session>) {
        log::info!("Auth state change: {}", change);
        self.listeners.emit(ProviderAuthEvent::new(change, session));
    }

    /// Persist, announce and schedule the refresh of a new session
    fn commit(self: &Arc<Self>, session: Session, change: AuthChangeEvent) -> AppResult<Session> {
        self.storage
            .set_item(&self.storage_key, &serde_json::to_string(&session)?)?;
        self.schedule_refresh(&session);
        self.notify(change, Some(session.clone()));
        Ok(session)
    }

    fn clear(&self) -> AppResult<()> {
        self.cancel_refresh();
        self.storage.remove_item(&self.storage_key)?;
        self.notify(AuthChangeEvent::SignedOut, None);
        Ok(())
    }

    async fn token_request(&self, grant_type: &str, body: Value) -> AppResult<Session> {
        let response = self
            .http
            .request(Method::POST, "/auth/v1/token", None)
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;

        let response = ensure_auth_success(response).await?;
        let session: Session = response.json().await?;
        Ok(session.with_issued_at(Utc::now()))
    }

    async fn refresh(self: &Arc<Self>) -> AppResult<Session> {
        let current = self
            .load_session()?
            .ok_or_else(|| AppError::auth(401, "Auth session missing!"))?;

        match self
            .token_request("refresh_token", json!({ "refresh_token": current.refresh_token }))
            .await
        {
            Ok(session) => self.commit(session, AuthChangeEvent::TokenRefreshed),
            Err(e @ AppError::Auth { .. }) => {
                // The refresh token was rejected; the stored session is dead
                log::warn!("Session refresh rejected: {}", e);
                self.clear()?;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn schedule_refresh(self: &Arc<Self>, session: &Session) {
        self.cancel_refresh();

        let Some(expires_at) = session.expires_at() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::debug!("No async runtime; automatic token refresh disabled");
            return;
        };

        let delay = (expires_at - self.refresh_margin - Utc::now())
            .to_std()
            .unwrap_or_default();
        let weak: Weak<AuthInner> = Arc::downgrade(self);

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(inner) = weak.upgrade() else {
                return;
            };
            // Release our own handle so the next schedule does not abort us
            inner
                .refresh_task
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();

            if let Err(e) = inner.refresh().await {
                log::warn!("Automatic token refresh failed: {}", e);
            }
        });

        *self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn cancel_refresh(&self) {
        if let Some(handle) = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for AuthInner {
    fn drop(&mut self) {
        self.cancel_refresh();
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn get_session(&self) -> AppResult<Option<Session>> {
        let Some(session) = self.inner.load_session()? else {
            return Ok(None);
        };

        if !session.expires_within(self.inner.refresh_margin, Utc::now()) {
            return Ok(Some(session));
        }

        match self.inner.refresh().await {
            Ok(session) => Ok(Some(session)),
            Err(AppError::Auth { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn refresh_session(&self) -> AppResult<Session> {
        self.inner.refresh().await
    }

    async fn get_user(&self) -> AppResult<Option<User>> {
        let Some(session) = self.get_session().await? else {
            return Ok(None);
        };

        let response = self
            .inner
            .http
            .request(Method::GET, "/auth/v1/user", Some(&session.access_token))
            .send()
            .await?;

        let user: User = ensure_auth_success(response).await?.json().await?;
        Ok(Some(user))
    }

    async fn sign_up(&self, request: SignUpRequest) -> AppResult<SignUpOutcome> {
        let response = self
            .inner
            .http
            .request(Method::POST, "/auth/v1/signup", None)
            .query(&[("redirect_to", request.email_redirect_to.as_str())])
            .json(&json!({
                "email": request.email,
                "password": request.password,
                "data": { "username": request.username },
            }))
            .send()
            .await?;

        let body: Value = ensure_auth_success(response).await?.json().await?;

        // With auto-confirm the provider answers with a full session,
        // otherwise with the bare (unconfirmed) user
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            let session = self
                .inner
                .commit(session.with_issued_at(Utc::now()), AuthChangeEvent::SignedIn)?;
            Ok(SignUpOutcome {
                user: Some(session.user.clone()),
                session: Some(session),
            })
        } else {
            let user: User = serde_json::from_value(body)?;
            Ok(SignUpOutcome {
                user: Some(user),
                session: None,
            })
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let session = self
            .inner
            .token_request("password", json!({ "email": email, "password": password }))
            .await?;
        self.inner.commit(session, AuthChangeEvent::SignedIn)
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> AppResult<String> {
        let verifier = generate_code_verifier();
        let challenge = generate_code_challenge(&verifier);
        self.inner
            .storage
            .set_item(&self.inner.verifier_key, &verifier)?;

        let mut url = Url::parse(&self.inner.http.endpoint("/auth/v1/authorize"))?;
        url.query_pairs_mut()
            .append_pair("provider", &provider.to_string())
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", CHALLENGE_METHOD);

        Ok(url.into())
    }

    async fn exchange_code_for_session(&self, auth_code: &str) -> AppResult<Session> {
        let verifier = self
            .inner
            .storage
            .get_item(&self.inner.verifier_key)?
            .ok_or_else(|| {
                AppError::auth(400, "Code verifier not found; restart the sign-in flow")
            })?;

        let result = self
            .inner
            .token_request(
                "pkce",
                json!({ "auth_code": auth_code, "code_verifier": verifier }),
            )
            .await;
        self.inner.storage.remove_item(&self.inner.verifier_key)?;

        self.inner.commit(result?, AuthChangeEvent::SignedIn)
    }

    async fn sign_out(&self) -> AppResult<()> {
        if let Some(session) = self.inner.load_session()? {
            let response = self
                .inner
                .http
                .request(Method::POST, "/auth/v1/logout", Some(&session.access_token))
                .send()
                .await?;

            match ensure_auth_success(response).await {
                Ok(_) => {}
                // Token already invalid server side; still sign out locally
                Err(AppError::Auth { status: 401 | 403 | 404, .. }) => {}
                Err(e) => return Err(e),
            }
        }

        self.inner.clear()
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()> {
        let response = self
            .inner
            .http
            .request(Method::POST, "/auth/v1/recover", None)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;

        ensure_auth_success(response).await?;
        Ok(())
    }

    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
        self.inner
            .listeners
            .subscribe::<ProviderAuthEvent, _>(move |event| {
                callback(event.change, event.session.clone())
            })
    }
}
