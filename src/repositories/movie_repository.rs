// src/repositories/movie_repository.rs
//
// Movie persistence over the hosted REST data store
//
// Every request carries the signed-in user's access token; row level
// security on the store limits rows to their owner.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use crate::domain::{MovieRecord, NewMovieRecord};
use crate::error::{AppError, AppResult};
use crate::integrations::supabase::{ensure_api_success, SupabaseHttp};
use crate::integrations::AuthProvider;

/// Table holding movie records
pub const MOVIES_TABLE: &str = "movies";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// All records owned by `user_id`, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<MovieRecord>>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MovieRecord>>;

    /// Insert and return the stored row (with its assigned id and timestamps)
    async fn insert(&self, movie: &NewMovieRecord) -> AppResult<MovieRecord>;
}

pub struct SupabaseMovieRepository {
    http: SupabaseHttp,
    auth: Arc<dyn AuthProvider>,
}

impl SupabaseMovieRepository {
    pub fn new(http: SupabaseHttp, auth: Arc<dyn AuthProvider>) -> Self {
        Self { http, auth }
    }

    fn table_path() -> String {
        format!("/rest/v1/{}", MOVIES_TABLE)
    }

    async fn access_token(&self) -> AppResult<String> {
        self.auth
            .get_session()
            .await?
            .map(|session| session.access_token)
            .ok_or(AppError::Unauthenticated)
    }

    async fn select(&self, filters: &[(&str, String)]) -> AppResult<Vec<MovieRecord>> {
        let token = self.access_token().await?;
        let response = self
            .http
            .request(Method::GET, &Self::table_path(), Some(&token))
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await?;

        let rows = ensure_api_success(response).await?.json().await?;
        Ok(rows)
    }
}

#[async_trait]
impl MovieRepository for SupabaseMovieRepository {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<MovieRecord>> {
        self.select(&[
            ("user_id", format!("eq.{}", user_id)),
            ("order", "created_at.desc".to_string()),
        ])
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MovieRecord>> {
        let rows = self.select(&[("id", format!("eq.{}", id))]).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, movie: &NewMovieRecord) -> AppResult<MovieRecord> {
        let token = self.access_token().await?;
        let response = self
            .http
            .request(Method::POST, &Self::table_path(), Some(&token))
            .header("Prefer", "return=representation")
            .json(movie)
            .send()
            .await?;

        let rows: Vec<MovieRecord> = ensure_api_success(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Other("Store returned no row for insert".to_string()))
    }
}
