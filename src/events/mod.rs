// src/events/mod.rs
//
// Internal Event System - Public API
//
// CRITICAL: EventHandler is INTERNAL and must NOT be exported

pub mod bus;
pub mod types;

// ============================================================================
// PUBLIC EXPORTS - Event Types and Bus Only
// ============================================================================

pub use types::DomainEvent;

pub use types::{
    // Session
    AuthStateChanged,
    ProviderAuthEvent,

    // Movies
    MovieSaved,
    MoviesFetched,

    // Notifications
    Notification,
    NotificationRaised,
    NotificationVariant,
};

pub use bus::{EventBus, EventLogEntry, Subscription};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
