// src/events/types.rs
//
// All application events.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AuthChangeEvent, Session};

/// Trait that all application events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// SESSION EVENTS
// ============================================================================

/// Emitted when the session store commits a new auth state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStateChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub change: AuthChangeEvent,
    pub user_id: Option<Uuid>,
}

impl AuthStateChanged {
    pub fn new(change: AuthChangeEvent, user_id: Option<Uuid>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            change,
            user_id,
        }
    }
}

impl DomainEvent for AuthStateChanged {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "AuthStateChanged" }
}

/// Raised by the auth provider itself, carrying the session it now holds.
/// Delivered to `on_auth_state_change` listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAuthEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub change: AuthChangeEvent,
    pub session: Option<Session>,
}

impl ProviderAuthEvent {
    pub fn new(change: AuthChangeEvent, session: Option<Session>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            change,
            session,
        }
    }
}

impl DomainEvent for ProviderAuthEvent {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ProviderAuthEvent" }
}

// ============================================================================
// MOVIE EVENTS
// ============================================================================

/// Emitted after the store accepted a new movie record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSaved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub movie_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub is_favorite: bool,
}

impl MovieSaved {
    pub fn new(movie_id: Uuid, user_id: Uuid, title: String, is_favorite: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            movie_id,
            user_id,
            title,
            is_favorite,
        }
    }
}

impl DomainEvent for MovieSaved {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "MovieSaved" }
}

/// Emitted when a collection fetch was committed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviesFetched {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub movie_count: usize,
    pub favorite_count: usize,
}

impl MoviesFetched {
    pub fn new(user_id: Uuid, movie_count: usize, favorite_count: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            user_id,
            movie_count,
            favorite_count,
        }
    }
}

impl DomainEvent for MoviesFetched {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "MoviesFetched" }
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// A non-blocking message for the user (toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

/// Emitted whenever a component wants to show a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRaised {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub notification: Notification,
}

impl NotificationRaised {
    pub fn new(notification: Notification) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            notification,
        }
    }
}

impl DomainEvent for NotificationRaised {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "NotificationRaised" }
}
