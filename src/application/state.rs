// src/application/state.rs
//
// Application state shared by every command.
// Adapters (auth provider, store, change feed, metadata client) are built
// in main.rs, or by tests, and handed in here; the services are wired once.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::EventBus;
use crate::integrations::{AuthProvider, ChangeFeed, MetadataClient};
use crate::repositories::MovieRepository;
use crate::services::{
    AuthFormService, DashboardService, MovieCollection, MovieSearchPanel, Navigator,
    ReviewSubmissionForm, SessionStore,
};

/// All fields are Arc-wrapped for sharing across commands and tasks.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub event_bus: Arc<EventBus>,
    pub navigator: Arc<Navigator>,
    pub sessions: Arc<SessionStore>,
    pub collection: Arc<MovieCollection>,
    pub search: Arc<MovieSearchPanel>,
    pub review_form: Arc<ReviewSubmissionForm>,
    pub auth_forms: Arc<AuthFormService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthProvider>,
        repository: Arc<dyn MovieRepository>,
        change_feed: Arc<dyn ChangeFeed>,
        metadata: Arc<dyn MetadataClient>,
    ) -> Self {
        let config = Arc::new(config);
        let event_bus = Arc::new(EventBus::new());
        let navigator = Arc::new(Navigator::default());

        let sessions = Arc::new(SessionStore::new(
            Arc::clone(&auth),
            Arc::clone(&event_bus),
            Arc::clone(&navigator),
        ));
        let collection = Arc::new(MovieCollection::new(
            Arc::clone(&repository),
            change_feed,
            Arc::clone(&event_bus),
        ));
        let search = Arc::new(MovieSearchPanel::new(
            metadata,
            Arc::clone(&event_bus),
            config.search_debounce(),
            config.search_min_chars,
        ));
        let review_form = Arc::new(ReviewSubmissionForm::new(
            Arc::clone(&repository),
            Arc::clone(&sessions),
            Arc::clone(&event_bus),
        ));
        let auth_forms = Arc::new(AuthFormService::new(
            Arc::clone(&auth),
            Arc::clone(&navigator),
            Arc::clone(&event_bus),
            Arc::clone(&config),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&collection),
            Arc::clone(&sessions),
            repository,
            auth,
        ));

        Self {
            config,
            event_bus,
            navigator,
            sessions,
            collection,
            search,
            review_form,
            auth_forms,
            dashboard,
        }
    }

    /// Resolve the session, keep the collection on the signed-in user and
    /// settle the current location. Needs a running tokio runtime.
    pub async fn start(&self) {
        self.sessions.start().await;
        self.collection.bind_to_session(&self.sessions);
        if let Some(user) = self.sessions.current_user() {
            self.collection.set_user(Some(user.id)).await;
        }
        self.navigator.refresh(&self.sessions.state());
        log::info!(
            "Client started ({})",
            if self.sessions.state().is_authenticated() {
                "signed in"
            } else {
                "signed out"
            }
        );
    }
}
