// src/services/dashboard.rs
//
// Dashboard Service - read-only projections over the live collection
//
// ARCHITECTURE:
// - Stats and profile are derived from the collection's committed list
// - The profile asks the provider for the current user record and falls
//   back to the session's copy when that lookup fails
// - A movie detail falls back to the store only when the record is not
//   loaded yet (e.g. a deep link opened before the first fetch finished)

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{DashboardStats, MovieRecord, ProfileSummary};
use crate::error::{AppError, AppResult};
use crate::integrations::AuthProvider;
use crate::repositories::MovieRepository;
use crate::services::movie_collection::MovieCollection;
use crate::services::session_store::SessionStore;

pub struct DashboardService {
    collection: Arc<MovieCollection>,
    sessions: Arc<SessionStore>,
    repository: Arc<dyn MovieRepository>,
    auth: Arc<dyn AuthProvider>,
}

impl DashboardService {
    pub fn new(
        collection: Arc<MovieCollection>,
        sessions: Arc<SessionStore>,
        repository: Arc<dyn MovieRepository>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            collection,
            sessions,
            repository,
            auth,
        }
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_movies(&self.collection.movies())
    }

    /// Profile card for the signed-in user, with the freshest user metadata
    /// the provider has
    pub async fn profile(&self) -> AppResult<ProfileSummary> {
        let session_user = self.sessions.current_user().ok_or(AppError::Unauthenticated)?;

        let user = match self.auth.get_user().await {
            Ok(Some(fresh)) if fresh.id == session_user.id => fresh,
            Ok(_) => session_user,
            Err(e) => {
                log::warn!("Using session copy of user {}: {}", session_user.id, e);
                session_user
            }
        };

        Ok(ProfileSummary::build(&user, &self.collection.movies()))
    }

    /// One of the signed-in user's records
    pub async fn movie_detail(&self, movie_id: Uuid) -> AppResult<MovieRecord> {
        let user = self.sessions.current_user().ok_or(AppError::Unauthenticated)?;

        if let Some(movie) = self.collection.state().find(movie_id).cloned() {
            return Ok(movie);
        }

        match self.repository.get_by_id(movie_id).await? {
            Some(movie) if movie.user_id == user.id => Ok(movie),
            Some(_) => {
                log::warn!("Movie {} belongs to another user", movie_id);
                Err(AppError::NotFound)
            }
            None => Err(AppError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::integrations::AuthProvider;
    use crate::repositories::MockMovieRepository;
    use crate::services::navigation::Navigator;
    use crate::services::test_support::{
        fake_session, fake_user, sample_movie, FakeAuthProvider, ManualChangeFeed,
    };

    async fn service(
        movies: Vec<MovieRecord>,
        repository: MockMovieRepository,
        user: crate::domain::User,
    ) -> DashboardService {
        let auth = Arc::new(FakeAuthProvider::signed_in(fake_session(user.clone())));
        service_with_auth(movies, repository, user, auth).await
    }

    async fn service_with_auth(
        movies: Vec<MovieRecord>,
        mut repository: MockMovieRepository,
        user: crate::domain::User,
        auth: Arc<FakeAuthProvider>,
    ) -> DashboardService {
        let listed = movies.clone();
        repository
            .expect_list_for_user()
            .returning(move |_| Ok(listed.clone()));
        let repository: Arc<dyn MovieRepository> = Arc::new(repository);

        let auth: Arc<dyn AuthProvider> = auth;
        let bus = Arc::new(EventBus::new());
        let sessions = Arc::new(SessionStore::new(
            Arc::clone(&auth),
            Arc::clone(&bus),
            Arc::new(Navigator::default()),
        ));
        sessions.start().await;

        let collection = Arc::new(MovieCollection::new(
            Arc::clone(&repository),
            Arc::new(ManualChangeFeed::new()),
            bus,
        ));
        collection.set_user(Some(user.id)).await;

        DashboardService::new(collection, sessions, repository, auth)
    }

    #[tokio::test]
    async fn test_stats_and_profile_follow_collection() {
        let mut user = fake_user("ada@example.com");
        user.user_metadata.username = Some("ada".to_string());
        let movies = vec![
            sample_movie(user.id, "The Godfather", 5, true),
            sample_movie(user.id, "Heat", 4, false),
        ];

        let service = service(movies, MockMovieRepository::new(), user).await;

        let stats = service.stats();
        assert_eq!(stats.total_movies, 2);
        assert_eq!(stats.average_rating, 4.5);
        assert_eq!(stats.favorite_count, 1);

        let profile = service.profile().await.unwrap();
        assert_eq!(profile.display_name, "ada");
        assert_eq!(profile.initials, "A");
        assert_eq!(profile.recent_activity.len(), 2);
    }

    #[tokio::test]
    async fn test_profile_uses_provider_user_metadata() {
        let mut user = fake_user("ada@example.com");
        user.user_metadata.username = Some("ada".to_string());
        let auth = Arc::new(FakeAuthProvider::signed_in(fake_session(user.clone())));

        let mut renamed = user.clone();
        renamed.user_metadata.username = Some("lovelace".to_string());
        auth.set_remote_user(renamed);

        let service =
            service_with_auth(Vec::new(), MockMovieRepository::new(), user, Arc::clone(&auth))
                .await;

        let profile = service.profile().await.unwrap();
        assert_eq!(profile.display_name, "lovelace");
        assert_eq!(profile.initials, "L");
        assert!(auth.calls().contains(&"get_user".to_string()));
    }

    #[tokio::test]
    async fn test_profile_falls_back_to_session_user() {
        let mut user = fake_user("ada@example.com");
        user.user_metadata.username = Some("ada".to_string());
        let auth = Arc::new(FakeAuthProvider::signed_in(fake_session(user.clone())));
        auth.fail_get_user("JWT expired");

        let service =
            service_with_auth(Vec::new(), MockMovieRepository::new(), user, auth).await;

        assert_eq!(service.profile().await.unwrap().display_name, "ada");
    }

    #[tokio::test]
    async fn test_movie_detail_from_loaded_collection() {
        let user = fake_user("ada@example.com");
        let movies = vec![sample_movie(user.id, "Heat", 4, false)];
        let wanted = movies[0].clone();

        let mut repository = MockMovieRepository::new();
        repository.expect_get_by_id().never();

        let service = service(movies, repository, user).await;
        assert_eq!(service.movie_detail(wanted.id).await.unwrap(), wanted);
    }

    #[tokio::test]
    async fn test_movie_detail_hides_other_users_records() {
        let user = fake_user("ada@example.com");
        let foreign = sample_movie(Uuid::new_v4(), "Alien", 5, false);
        let foreign_id = foreign.id;

        let mut repository = MockMovieRepository::new();
        repository
            .expect_get_by_id()
            .returning(move |_| Ok(Some(foreign.clone())));

        let service = service(Vec::new(), repository, user).await;
        assert!(matches!(
            service.movie_detail(foreign_id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unknown_movie_is_not_found() {
        let user = fake_user("ada@example.com");
        let mut repository = MockMovieRepository::new();
        repository.expect_get_by_id().returning(|_| Ok(None));

        let service = service(Vec::new(), repository, user).await;
        assert!(matches!(
            service.movie_detail(Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
    }
}
