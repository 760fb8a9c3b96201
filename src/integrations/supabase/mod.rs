// src/integrations/supabase/mod.rs
//
// Hosted backend integration (auth + REST data store)
//
// ARCHITECTURE:
// - One shared HTTP client carrying the project headers
// - auth.rs speaks the GoTrue auth API
// - The REST data store is reached through repositories::movie_repository
// - realtime.rs provides the change feed
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Remote error bodies are surfaced verbatim as the error message

pub mod auth;
pub mod pkce;
pub mod realtime;

pub use auth::SupabaseAuthClient;
pub use realtime::PollingChangeFeed;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// HTTP plumbing shared by every backend call
#[derive(Clone)]
pub struct SupabaseHttp {
    client: Client,
    base_url: String,
    anon_key: String,
    client_info: String,
}

impl SupabaseHttp {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            client_info: config.client_info.clone(),
        })
    }

    /// Absolute URL for a path such as `/auth/v1/token`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request with project headers. Without a user token the anon key is
    /// sent as the bearer, matching what the backend expects for public calls.
    pub fn request(&self, method: Method, path: &str, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.client
            .request(method, self.endpoint(path))
            .header("apikey", &self.anon_key)
            .header("X-Client-Info", &self.client_info)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
    }
}

/// Pull a human-readable message out of an error body.
///
/// Auth responses use `msg` or `error_description`, REST responses use
/// `message`. Falls back to the raw body, then to the status line.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "error_description", "message", "error"] {
            if let Some(text) = json.get(key).and_then(Value::as_str) {
                if !text.trim().is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}

/// Return the response on 2xx, otherwise an `AppError::Auth` with the body's message
pub(crate) async fn ensure_auth_success(response: Response) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::auth(status, error_message(status, &body)))
}

/// Return the response on 2xx, otherwise an `AppError::Api` with the body's message
pub(crate) async fn ensure_api_success(response: Response) -> AppResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::api(status, error_message(status, &body)))
}
