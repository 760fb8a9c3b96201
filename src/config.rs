// src/config.rs
//
// Client configuration.
//
// Every field has a working default except the two API keys, which must be
// supplied by the binary (flags or environment).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Local storage key holding the persisted session
pub const DEFAULT_STORAGE_KEY: &str = "supabase.auth.token";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the backend project (auth + REST live under it)
    pub supabase_url: String,
    /// Public anon key sent as `apikey`
    pub supabase_anon_key: String,
    /// Origin of the client, used to build auth redirect targets
    pub site_url: String,
    pub omdb_base_url: String,
    pub omdb_api_key: String,
    /// Value of the `X-Client-Info` header
    pub client_info: String,
    pub storage_key: String,
    /// SQLite file for local storage; `None` uses the user data directory
    pub database_path: Option<PathBuf>,
    pub search_debounce_ms: u64,
    pub search_min_chars: usize,
    pub change_feed_poll_ms: u64,
    pub http_timeout_secs: u64,
    /// Refresh the access token this long before it expires
    pub refresh_margin_secs: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            site_url: "http://localhost:8080".to_string(),
            omdb_base_url: "https://www.omdbapi.com/".to_string(),
            omdb_api_key: String::new(),
            client_info: "my-movie-journal@1.0.0".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            database_path: None,
            search_debounce_ms: 500,
            search_min_chars: 2,
            change_feed_poll_ms: 5000,
            http_timeout_secs: 30,
            refresh_margin_secs: 60,
        }
    }
}

impl AppConfig {
    /// Reject configurations that cannot reach the backend
    pub fn validate(&self) -> AppResult<()> {
        url::Url::parse(&self.supabase_url)?;
        url::Url::parse(&self.omdb_base_url)?;
        url::Url::parse(&self.site_url)?;

        if self.supabase_anon_key.trim().is_empty() {
            return Err(AppError::Other(
                "Backend anon key is not configured".to_string(),
            ));
        }
        if self.omdb_api_key.trim().is_empty() {
            return Err(AppError::Other(
                "Movie metadata API key is not configured".to_string(),
            ));
        }
        if self.search_min_chars == 0 {
            return Err(AppError::Other(
                "Minimum search length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Key under which the PKCE code verifier is stored
    pub fn code_verifier_key(&self) -> String {
        format!("{}-code-verifier", self.storage_key)
    }

    /// Absolute URL of a client path, e.g. `/dashboard`
    pub fn site_path(&self, path: &str) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), path)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn change_feed_interval(&self) -> Duration {
        Duration::from_millis(self.change_feed_poll_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn refresh_margin(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_margin_secs)
    }
}
