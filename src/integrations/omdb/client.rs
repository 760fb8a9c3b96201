// src/integrations/omdb/client.rs
//
// OMDb API Integration
//
// ARCHITECTURE:
// - Plain GET client, API key passed as a query parameter
// - Maps external payloads → domain value objects (NO domain mutation)
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - "N/A" placeholders never leak past this module
// - A "not found" answer to a search is an empty result, not an error

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::domain::search::{available, parse_runtime, parse_year};
use crate::domain::{MovieDetails, SearchCandidate};
use crate::error::{AppError, AppResult};
use crate::integrations::metadata::MetadataClient;

/// Error text OMDb returns for a search with no hits
const NOT_FOUND_MESSAGE: &str = "Movie not found!";

/// Every OMDb response carries `Response: "True" | "False"` and, when
/// false, an `Error` string. The remaining fields are flattened in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(flatten)]
    body: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(rename = "Search", default)]
    search: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Type", default)]
    kind: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailBody {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Rated")]
    rated: Option<String>,
    #[serde(rename = "Runtime")]
    runtime: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Actors")]
    actors: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

/// OMDb API Client
pub struct OmdbClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl OmdbClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let http_client = Client::builder().timeout(config.http_timeout()).build()?;

        Ok(Self {
            base_url: config.omdb_base_url.clone(),
            api_key: config.omdb_api_key.clone(),
            http_client,
        })
    }

    // ========================================================================
    // INTERNAL: Request Execution
    // ========================================================================

    async fn execute<T>(&self, params: &[(&str, &str)]) -> AppResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .get(&self.base_url)
            .header(header::ACCEPT, "application/json")
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::api(status.as_u16(), omdb_error(&body, status.as_u16())));
        }

        let envelope: Envelope<T> = response.json().await?;
        Self::unwrap_envelope(envelope, status.as_u16())
    }

    /// `Ok(None)` for the no-hit answer, the body for success
    fn unwrap_envelope<T>(envelope: Envelope<T>, status: u16) -> AppResult<Option<T>> {
        if envelope.response.eq_ignore_ascii_case("true") {
            return envelope
                .body
                .map(Some)
                .ok_or_else(|| AppError::api(status, "Metadata API returned no data"));
        }

        match envelope.error {
            Some(message) if message == NOT_FOUND_MESSAGE => Ok(None),
            Some(message) => Err(AppError::api(status, message)),
            None => Err(AppError::api(status, "Metadata API request failed")),
        }
    }

    fn map_candidate(item: SearchItem) -> SearchCandidate {
        SearchCandidate {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            kind: item.kind,
            poster: available(item.poster),
        }
    }

    fn map_details(body: DetailBody) -> MovieDetails {
        MovieDetails {
            id: body.imdb_id,
            title: body.title,
            year: available(body.year).as_deref().and_then(parse_year),
            poster: available(body.poster),
            plot: available(body.plot),
            genre: available(body.genre),
            runtime: available(body.runtime).as_deref().and_then(parse_runtime),
            director: available(body.director),
            actors: available(body.actors),
            rated: available(body.rated),
        }
    }
}

/// OMDb reports failures as `{"Response":"False","Error":"..."}`, even on 401
fn omdb_error(body: &str, status: u16) -> String {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| format!("Metadata API returned status: {}", status))
}

#[async_trait]
impl MetadataClient for OmdbClient {
    async fn search(&self, query: &str) -> AppResult<Vec<SearchCandidate>> {
        let body: Option<SearchBody> = self.execute(&[("s", query)]).await?;

        Ok(body
            .map(|b| b.search.into_iter().map(Self::map_candidate).collect())
            .unwrap_or_default())
    }

    async fn details(&self, id: &str) -> AppResult<MovieDetails> {
        let body: Option<DetailBody> = self.execute(&[("i", id), ("plot", "full")]).await?;
        body.map(Self::map_details).ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_payload_maps_to_candidates() {
        let raw = r#"{
            "Search": [
                {"Title":"The Godfather","Year":"1972","imdbID":"tt0068646","Type":"movie","Poster":"https://img/godfather.jpg"},
                {"Title":"The Godfather Part II","Year":"1974","imdbID":"tt0071562","Type":"movie","Poster":"N/A"}
            ],
            "totalResults":"2",
            "Response":"True"
        }"#;
        let envelope: Envelope<SearchBody> = serde_json::from_str(raw).unwrap();
        let body = OmdbClient::unwrap_envelope(envelope, 200).unwrap().unwrap();
        let candidates: Vec<SearchCandidate> =
            body.search.into_iter().map(OmdbClient::map_candidate).collect();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "tt0068646");
        assert_eq!(candidates[0].year, "1972");
        assert_eq!(candidates[1].poster, None);
    }

    #[test]
    fn test_not_found_is_empty_not_error() {
        let raw = r#"{"Response":"False","Error":"Movie not found!"}"#;
        let envelope: Envelope<SearchBody> = serde_json::from_str(raw).unwrap();
        assert!(OmdbClient::unwrap_envelope(envelope, 200).unwrap().is_none());
    }

    #[test]
    fn test_other_errors_surface_message() {
        let raw = r#"{"Response":"False","Error":"Too many results."}"#;
        let envelope: Envelope<SearchBody> = serde_json::from_str(raw).unwrap();
        let err = OmdbClient::unwrap_envelope(envelope, 200).unwrap_err();
        assert_eq!(err.to_string(), "Too many results.");
    }

    #[test]
    fn test_detail_payload_maps_runtime_and_year() {
        let raw = r#"{
            "Title":"The Godfather","Year":"1972","Rated":"R","Runtime":"175 min",
            "Genre":"Crime, Drama","Director":"Francis Ford Coppola",
            "Actors":"Marlon Brando, Al Pacino","Plot":"The aging patriarch...",
            "Poster":"https://img/godfather.jpg","imdbID":"tt0068646","Response":"True"
        }"#;
        let envelope: Envelope<DetailBody> = serde_json::from_str(raw).unwrap();
        let details = OmdbClient::map_details(
            OmdbClient::unwrap_envelope(envelope, 200).unwrap().unwrap(),
        );

        assert_eq!(details.year, Some(1972));
        assert_eq!(details.runtime, Some(175));
        assert_eq!(details.genre.as_deref(), Some("Crime, Drama"));
        assert_eq!(details.rated.as_deref(), Some("R"));
    }

    #[test]
    fn test_error_body_on_http_failure() {
        assert_eq!(
            omdb_error(r#"{"Response":"False","Error":"Invalid API key!"}"#, 401),
            "Invalid API key!"
        );
        assert_eq!(omdb_error("", 503), "Metadata API returned status: 503");
    }
}
