// src/services/movie_collection.rs
//
// Movie Collection - the signed-in user's records, kept live
//
// CRITICAL RULES:
// - Every fetch takes a sequence number; only the latest issued fetch may
//   commit, so a slow older response can never overwrite a newer one
// - The change feed subscription belongs to exactly one user and is torn
//   down on user change and on drop
// - Favorites are always derived from the committed list

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::{filter_favorites, MovieRecord};
use crate::events::{EventBus, MoviesFetched};
use crate::integrations::{ChangeFeed, ChangeFilter, FeedSubscription};
use crate::repositories::MovieRepository;
use crate::services::session_store::SessionStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionState {
    pub user_id: Option<Uuid>,
    /// Newest first
    pub movies: Vec<MovieRecord>,
    pub favorite_movies: Vec<MovieRecord>,
    pub loading: bool,
}

impl CollectionState {
    fn empty(user_id: Option<Uuid>, loading: bool) -> Self {
        Self {
            user_id,
            movies: Vec::new(),
            favorite_movies: Vec::new(),
            loading,
        }
    }

    pub fn find(&self, id: Uuid) -> Option<&MovieRecord> {
        self.movies.iter().find(|m| m.id == id)
    }
}

pub struct MovieCollection {
    inner: Arc<CollectionInner>,
    feed: Arc<dyn ChangeFeed>,
    feed_subscription: Mutex<Option<FeedSubscription>>,
    session_watcher: Mutex<Option<JoinHandle<()>>>,
}

struct CollectionInner {
    repository: Arc<dyn MovieRepository>,
    event_bus: Arc<EventBus>,
    state: watch::Sender<CollectionState>,
    sequence: AtomicU64,
}

impl CollectionInner {
    async fn fetch(&self, user_id: Uuid) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.repository.list_for_user(user_id).await;

        if self.sequence.load(Ordering::SeqCst) != seq {
            log::debug!("Discarding superseded fetch #{} for {}", seq, user_id);
            return;
        }

        match result {
            Ok(movies) => {
                let favorite_movies = filter_favorites(&movies);
                let (movie_count, favorite_count) = (movies.len(), favorite_movies.len());

                let committed = self.state.send_if_modified(|state| {
                    if state.user_id != Some(user_id) {
                        return false;
                    }
                    state.movies = movies;
                    state.favorite_movies = favorite_movies;
                    state.loading = false;
                    true
                });

                if committed {
                    self.event_bus
                        .emit(MoviesFetched::new(user_id, movie_count, favorite_count));
                }
            }
            Err(e) => {
                // Keep what we had; just stop loading
                log::error!("Error fetching movies: {}", e);
                self.state.send_if_modified(|state| {
                    let changed = state.user_id == Some(user_id) && state.loading;
                    if changed {
                        state.loading = false;
                    }
                    changed
                });
            }
        }
    }

    fn current_user(&self) -> Option<Uuid> {
        self.state.borrow().user_id
    }
}

impl MovieCollection {
    pub fn new(
        repository: Arc<dyn MovieRepository>,
        feed: Arc<dyn ChangeFeed>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let (state, _) = watch::channel(CollectionState::empty(None, true));
        Self {
            inner: Arc::new(CollectionInner {
                repository,
                event_bus,
                state,
                sequence: AtomicU64::new(0),
            }),
            feed,
            feed_subscription: Mutex::new(None),
            session_watcher: Mutex::new(None),
        }
    }

    /// Switch to `user_id` (or to nobody) and load their records
    pub async fn set_user(&self, user_id: Option<Uuid>) {
        if self.inner.current_user() == user_id && user_id.is_some() {
            return;
        }

        // Old subscription and in-flight fetches belong to the previous user
        self.feed_subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.inner.sequence.fetch_add(1, Ordering::SeqCst);

        let Some(user_id) = user_id else {
            self.inner.state.send_replace(CollectionState::empty(None, false));
            return;
        };

        self.inner
            .state
            .send_replace(CollectionState::empty(Some(user_id), true));

        let weak: Weak<CollectionInner> = Arc::downgrade(&self.inner);
        let subscription = self.feed.subscribe(
            ChangeFilter::movies_for_user(user_id),
            Arc::new(move |change| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                log::debug!("Movies changed ({}), refetching", change.kind);
                tokio::spawn(async move { inner.fetch(user_id).await });
            }),
        );
        *self
            .feed_subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(subscription);

        self.inner.fetch(user_id).await;
    }

    /// Fetch again for the current user; no-op when signed out
    pub async fn refetch(&self) {
        if let Some(user_id) = self.inner.current_user() {
            self.inner.fetch(user_id).await;
        }
    }

    /// Follow the session store: every user change re-targets the collection
    pub fn bind_to_session(self: &Arc<Self>, sessions: &SessionStore) {
        let mut rx = sessions.watch();
        let weak = Arc::downgrade(self);

        let task = tokio::spawn(async move {
            let mut last: Option<Option<Uuid>> = None;
            loop {
                let user_id = {
                    let state = rx.borrow_and_update();
                    if state.loading {
                        None
                    } else {
                        Some(state.user.as_ref().map(|u| u.id))
                    }
                };

                if let Some(user_id) = user_id {
                    if last != Some(user_id) {
                        let Some(collection) = weak.upgrade() else {
                            break;
                        };
                        collection.set_user(user_id).await;
                        last = Some(user_id);
                    }
                }

                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        if let Some(previous) = self
            .session_watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task)
        {
            previous.abort();
        }
    }

    pub fn state(&self) -> CollectionState {
        self.inner.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<CollectionState> {
        self.inner.state.subscribe()
    }

    pub fn movies(&self) -> Vec<MovieRecord> {
        self.inner.state.borrow().movies.clone()
    }

    pub fn favorite_movies(&self) -> Vec<MovieRecord> {
        self.inner.state.borrow().favorite_movies.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }
}

impl Drop for MovieCollection {
    fn drop(&mut self) {
        if let Some(task) = self
            .session_watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
        self.feed_subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
