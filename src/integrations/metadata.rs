// src/integrations/metadata.rs
//
// Movie metadata seam: keyword search plus single-title lookup.

use async_trait::async_trait;

use crate::domain::{MovieDetails, SearchCandidate};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Candidates matching `query`; no match is an empty list, not an error
    async fn search(&self, query: &str) -> AppResult<Vec<SearchCandidate>>;

    async fn details(&self, id: &str) -> AppResult<MovieDetails>;
}
