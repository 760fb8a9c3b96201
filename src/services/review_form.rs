// src/services/review_form.rs
//
// Review Submission Form - rating, review text and favorite flag for a
// selected movie, persisted as one new record
//
// CRITICAL RULES:
// - Submission is impossible without a selected movie and a rating of 1-5;
//   no request is issued in that case
// - On failure the form keeps its input so the user can retry
// - On success the form resets and the caller navigates to the dashboard

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::domain::{
    validate_new_movie, Location, MovieDetails, MovieRecord, NewMovieRecord, DASHBOARD_PATH,
    MAX_RATING,
};
use crate::events::{EventBus, MovieSaved, Notification, NotificationRaised};
use crate::repositories::MovieRepository;
use crate::services::session_store::SessionStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewFormState {
    pub movie: Option<MovieDetails>,
    /// 0 means "not rated yet"
    pub rating: u8,
    pub review: String,
    pub is_favorite: bool,
    pub submitting: bool,
}

impl ReviewFormState {
    pub fn can_submit(&self) -> bool {
        self.movie.is_some() && self.rating > 0 && !self.submitting
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Saved {
        movie: MovieRecord,
        navigate_to: Location,
    },
    /// Nothing was sent
    Rejected { reason: String },
    /// The store refused the insert; `message` is its own text
    Failed { message: String },
}

pub struct ReviewSubmissionForm {
    repository: Arc<dyn MovieRepository>,
    sessions: Arc<SessionStore>,
    event_bus: Arc<EventBus>,
    state: Mutex<ReviewFormState>,
}

impl ReviewSubmissionForm {
    pub fn new(
        repository: Arc<dyn MovieRepository>,
        sessions: Arc<SessionStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            repository,
            sessions,
            event_bus,
            state: Mutex::new(ReviewFormState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReviewFormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ReviewFormState {
        self.lock().clone()
    }

    pub fn select_movie(&self, details: MovieDetails) {
        self.lock().movie = Some(details);
    }

    /// Drop the selected movie while a new one is looked up; typed input stays
    pub fn clear_movie(&self) {
        self.lock().movie = None;
    }

    /// Star rating; values above the maximum are capped, 0 clears
    pub fn set_rating(&self, rating: u8) {
        self.lock().rating = rating.min(MAX_RATING);
    }

    pub fn set_review(&self, review: &str) {
        self.lock().review = review.to_string();
    }

    pub fn set_favorite(&self, is_favorite: bool) {
        self.lock().is_favorite = is_favorite;
    }

    pub fn toggle_favorite(&self) -> bool {
        let mut state = self.lock();
        state.is_favorite = !state.is_favorite;
        state.is_favorite
    }

    /// Abandon the selection and everything typed for it
    pub fn cancel(&self) {
        *self.lock() = ReviewFormState::default();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let Some(user) = self.sessions.current_user() else {
            return SubmitOutcome::Rejected {
                reason: "You must be signed in to add movies".to_string(),
            };
        };

        let new_movie = {
            let mut state = self.lock();
            if !state.can_submit() {
                let reason = if state.movie.is_none() {
                    "Select a movie first"
                } else if state.submitting {
                    "A submission is already in progress"
                } else {
                    "Please select a rating"
                };
                return SubmitOutcome::Rejected {
                    reason: reason.to_string(),
                };
            }

            let Some(details) = state.movie.as_ref() else {
                return SubmitOutcome::Rejected {
                    reason: "Select a movie first".to_string(),
                };
            };
            let new_movie = NewMovieRecord::compose(
                user.id,
                details,
                state.rating,
                &state.review,
                state.is_favorite,
            );
            state.submitting = true;
            new_movie
        };

        if let Err(e) = validate_new_movie(&new_movie) {
            self.lock().submitting = false;
            return SubmitOutcome::Rejected {
                reason: e.to_string(),
            };
        }

        match self.repository.insert(&new_movie).await {
            Ok(movie) => {
                log::info!("Saved '{}' for user {}", movie.title, movie.user_id);
                *self.lock() = ReviewFormState::default();

                self.event_bus.emit(MovieSaved::new(
                    movie.id,
                    movie.user_id,
                    movie.title.clone(),
                    movie.is_favorite,
                ));
                self.event_bus.emit(NotificationRaised::new(Notification::info(
                    "Movie added!",
                    format!("{} has been added to your collection.", movie.title),
                )));

                SubmitOutcome::Saved {
                    movie,
                    navigate_to: Location::new(DASHBOARD_PATH),
                }
            }
            Err(e) => {
                let message = e.to_string();
                log::error!("Error adding movie: {}", message);
                self.lock().submitting = false;

                self.event_bus.emit(NotificationRaised::new(Notification::error(
                    "Error adding movie",
                    message.clone(),
                )));

                SubmitOutcome::Failed { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repositories::MockMovieRepository;
    use crate::services::navigation::Navigator;
    use crate::services::test_support::{
        fake_session, fake_user, godfather_details, FakeAuthProvider,
    };
    use chrono::Utc;
    use uuid::Uuid;

    async fn signed_in_sessions() -> Arc<SessionStore> {
        let auth = Arc::new(FakeAuthProvider::signed_in(fake_session(fake_user(
            "ada@example.com",
        ))));
        let sessions = Arc::new(SessionStore::new(
            auth,
            Arc::new(EventBus::new()),
            Arc::new(Navigator::default()),
        ));
        sessions.start().await;
        sessions
    }

    fn stored(movie: &NewMovieRecord) -> MovieRecord {
        let now = Utc::now();
        MovieRecord {
            id: Uuid::new_v4(),
            user_id: movie.user_id,
            title: movie.title.clone(),
            year: movie.year,
            poster: movie.poster.clone(),
            plot: movie.plot.clone(),
            genre: movie.genre.clone(),
            runtime: movie.runtime,
            rating: Some(movie.rating),
            review: movie.review.clone(),
            is_favorite: movie.is_favorite,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_unrated_submission_sends_nothing() {
        let mut repository = MockMovieRepository::new();
        repository.expect_insert().never();

        let form = ReviewSubmissionForm::new(
            Arc::new(repository),
            signed_in_sessions().await,
            Arc::new(EventBus::new()),
        );
        form.select_movie(godfather_details());
        assert!(!form.state().can_submit());

        assert_eq!(
            form.submit().await,
            SubmitOutcome::Rejected {
                reason: "Please select a rating".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_successful_submission_persists_and_resets() {
        let sessions = signed_in_sessions().await;
        let user_id = sessions.current_user().unwrap().id;

        let mut repository = MockMovieRepository::new();
        repository
            .expect_insert()
            .withf(move |m| {
                m.user_id == user_id
                    && m.title == "The Godfather"
                    && m.rating == 5
                    && m.review.as_deref() == Some("A masterpiece.")
                    && m.is_favorite
                    && m.runtime == Some(175)
            })
            .times(1)
            .returning(|m| Ok(stored(m)));

        let bus = Arc::new(EventBus::new());
        let saved = Arc::new(Mutex::new(Vec::new()));
        let saved_clone = Arc::clone(&saved);
        let _sub = bus.subscribe::<MovieSaved, _>(move |e| {
            saved_clone.lock().unwrap().push(e.title.clone());
        });

        let form = ReviewSubmissionForm::new(Arc::new(repository), sessions, bus);
        form.select_movie(godfather_details());
        form.set_rating(5);
        form.set_review("A masterpiece.");
        form.toggle_favorite();

        match form.submit().await {
            SubmitOutcome::Saved { movie, navigate_to } => {
                assert_eq!(movie.title, "The Godfather");
                assert_eq!(navigate_to, Location::new("/dashboard"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        assert_eq!(form.state(), ReviewFormState::default());
        assert_eq!(*saved.lock().unwrap(), vec!["The Godfather".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_input_and_reports_raw_message() {
        let mut repository = MockMovieRepository::new();
        repository.expect_insert().returning(|_| {
            Err(AppError::api(
                403,
                "new row violates row-level security policy for table \"movies\"",
            ))
        });

        let form = ReviewSubmissionForm::new(
            Arc::new(repository),
            signed_in_sessions().await,
            Arc::new(EventBus::new()),
        );
        form.select_movie(godfather_details());
        form.set_rating(4);
        form.set_review("Long but worth it");

        assert_eq!(
            form.submit().await,
            SubmitOutcome::Failed {
                message: "new row violates row-level security policy for table \"movies\""
                    .to_string()
            }
        );

        let state = form.state();
        assert_eq!(state.rating, 4);
        assert_eq!(state.review, "Long but worth it");
        assert!(state.movie.is_some());
        assert!(!state.submitting);
    }

    #[tokio::test]
    async fn test_cancel_and_rating_cap() {
        let form = ReviewSubmissionForm::new(
            Arc::new(MockMovieRepository::new()),
            signed_in_sessions().await,
            Arc::new(EventBus::new()),
        );
        form.select_movie(godfather_details());
        form.set_rating(9);
        assert_eq!(form.state().rating, 5);

        form.cancel();
        assert_eq!(form.state(), ReviewFormState::default());
    }

    #[tokio::test]
    async fn test_cleared_movie_blocks_submission() {
        let mut repository = MockMovieRepository::new();
        repository.expect_insert().never();

        let form = ReviewSubmissionForm::new(
            Arc::new(repository),
            signed_in_sessions().await,
            Arc::new(EventBus::new()),
        );
        form.select_movie(godfather_details());
        form.set_rating(4);
        form.set_review("Still holds up");

        form.clear_movie();
        let state = form.state();
        assert!(state.movie.is_none());
        assert_eq!(state.rating, 4);
        assert_eq!(state.review, "Still holds up");
        assert!(!state.can_submit());

        assert_eq!(
            form.submit().await,
            SubmitOutcome::Rejected {
                reason: "Select a movie first".to_string()
            }
        );
    }
}
