// src/services/movie_search.rs
//
// Movie Search Panel - debounced metadata search and candidate selection
//
// CRITICAL RULES:
// - No request is issued for a query shorter than the minimum
// - Only the last query typed within the debounce window is sent
// - A response for a query that is no longer current is dropped
// - Failures and empty answers clear the results and raise a notification
// - Only the latest selection commits its details

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::search::normalize_query;
use crate::domain::{MovieDetails, SearchCandidate};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, Notification, NotificationRaised};
use crate::integrations::MetadataClient;
use crate::services::debounce::Debouncer;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchCandidate>,
    pub searching: bool,
    pub selected: Option<SearchCandidate>,
    pub details: Option<MovieDetails>,
    pub loading_details: bool,
}

pub struct MovieSearchPanel {
    inner: Arc<SearchInner>,
    debouncer: Debouncer,
}

struct SearchInner {
    client: Arc<dyn MetadataClient>,
    event_bus: Arc<EventBus>,
    state: watch::Sender<SearchState>,
    min_chars: usize,
    sequence: AtomicU64,
}

impl SearchInner {
    async fn run_search(&self, query: String, seq: u64) {
        self.state.send_modify(|state| state.searching = true);

        let result = self.client.search(&query).await;

        if self.sequence.load(Ordering::SeqCst) != seq {
            log::debug!("Dropping results for superseded query '{}'", query);
            return;
        }

        match result {
            Ok(results) if results.is_empty() => {
                log::debug!("Search '{}' found nothing", query);
                self.state.send_modify(|state| {
                    state.results.clear();
                    state.searching = false;
                });
                self.notify(Notification::info(
                    "No movies found",
                    format!("Nothing matched \"{}\". Try a different title.", query),
                ));
            }
            Ok(results) => {
                log::debug!("Search '{}' returned {} candidates", query, results.len());
                self.state.send_modify(|state| {
                    state.results = results;
                    state.searching = false;
                });
            }
            Err(e) => {
                log::error!("Search failed for '{}': {}", query, e);
                self.state.send_modify(|state| {
                    state.results.clear();
                    state.searching = false;
                });
                self.notify(Notification::error(
                    "Search failed",
                    "Could not search movies. Please try again.",
                ));
            }
        }
    }

    fn notify(&self, notification: Notification) {
        self.event_bus.emit(NotificationRaised::new(notification));
    }
}

impl MovieSearchPanel {
    pub fn new(
        client: Arc<dyn MetadataClient>,
        event_bus: Arc<EventBus>,
        debounce: Duration,
        min_chars: usize,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(SearchInner {
                client,
                event_bus,
                state,
                min_chars,
                sequence: AtomicU64::new(0),
            }),
            debouncer: Debouncer::new(debounce),
        }
    }

    /// New text in the search box
    pub fn on_input(&self, text: &str) {
        let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(query) = normalize_query(text, self.inner.min_chars) else {
            self.debouncer.cancel();
            self.inner.state.send_modify(|state| {
                state.query = text.to_string();
                state.results.clear();
                state.searching = false;
            });
            return;
        };

        self.inner
            .state
            .send_modify(|state| state.query = text.to_string());

        let inner = Arc::clone(&self.inner);
        self.debouncer
            .reset(async move { inner.run_search(query, seq).await });
    }

    /// Pick a candidate and look up its full details
    pub async fn select(&self, candidate_id: &str) -> AppResult<MovieDetails> {
        let candidate = self
            .inner
            .state
            .borrow()
            .results
            .iter()
            .find(|c| c.id == candidate_id)
            .cloned()
            .ok_or(AppError::NotFound)?;

        // Selecting ends the current search
        self.debouncer.cancel();
        let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|state| {
            state.query.clear();
            state.results.clear();
            state.searching = false;
            state.selected = Some(candidate.clone());
            state.details = None;
            state.loading_details = true;
        });

        let result = self.inner.client.details(&candidate.id).await;

        if self.inner.sequence.load(Ordering::SeqCst) != seq {
            log::debug!("Dropping details for superseded selection {}", candidate.id);
            return Err(AppError::Other(format!(
                "Selection of {} was superseded",
                candidate.id
            )));
        }

        match result {
            Ok(details) => {
                self.inner.state.send_modify(|state| {
                    state.details = Some(details.clone());
                    state.loading_details = false;
                });
                Ok(details)
            }
            Err(e) => {
                log::error!("Detail lookup failed for {}: {}", candidate.id, e);
                self.inner.state.send_modify(|state| {
                    state.selected = None;
                    state.loading_details = false;
                });
                self.inner.notify(Notification::error(
                    "Error",
                    "Could not load movie details. Please try again.",
                ));
                Err(e)
            }
        }
    }

    /// Back to an empty panel
    pub fn clear(&self) {
        self.debouncer.cancel();
        self.inner.sequence.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(SearchState::default());
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }
}
