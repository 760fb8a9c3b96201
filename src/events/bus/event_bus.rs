// events/bus/event_bus.rs
//
// Core event bus implementation.
//
// DESIGN PRINCIPLES:
// 1. Synchronous - handlers execute immediately in subscription order
// 2. Deterministic - same events → same result
// 3. Observable - every emission is logged; the in-memory log keeps only
//    the most recent entries
// 4. Type-safe - events are strongly typed
// 5. Scoped - every subscription is owned by a handle that removes it

use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::events::types::DomainEvent;

/// Type-erased event handler function
/// Takes a reference to Any (downcasted to concrete event type inside)
type EventHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

type HandlerMap = HashMap<TypeId, Vec<(u64, EventHandler)>>;

/// Entries kept in the in-memory event log; older ones are dropped first
pub const MAX_EVENT_LOG_ENTRIES: usize = 256;

/// The Event Bus
///
/// Central coordination point for application events. Components emit
/// events and subscribe to events without direct dependencies on each other.
///
/// Key characteristics:
/// - Synchronous execution
/// - Handlers execute in subscription order
/// - Handlers run outside the registry lock, so they may subscribe or
///   unsubscribe while being called
/// - Type-safe through generics
pub struct EventBus {
    /// Map from event TypeId to list of handlers
    handlers: Arc<RwLock<HandlerMap>>,

    /// Most recent emissions, oldest first (for debugging)
    event_log: Arc<RwLock<VecDeque<EventLogEntry>>>,

    next_id: Arc<AtomicU64>,
}

/// A logged event for debugging and tracing
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub event_type: String,
    pub event_id: String,
    pub occurred_at: String,
    pub handler_count: usize,
}

/// Keeps a handler registered for as long as it lives.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) removes the
/// handler. Use [`Subscription::detach`] for handlers that live as long as
/// the bus itself.
#[must_use = "dropping a Subscription immediately removes the handler"]
pub struct Subscription {
    handlers: Weak<RwLock<HandlerMap>>,
    type_id: TypeId,
    id: u64,
    active: bool,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Keep the handler registered for the lifetime of the bus
    pub fn detach(mut self) {
        self.active = false;
    }

    fn remove(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Some(handlers) = self.handlers.upgrade() {
            let mut handlers = handlers.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(list) = handlers.get_mut(&self.type_id) {
                list.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            event_log: Arc::new(RwLock::new(VecDeque::with_capacity(MAX_EVENT_LOG_ENTRIES))),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Subscribe to a specific event type
    ///
    /// The handler function receives a reference to the concrete event.
    /// Handlers are executed in the order they are subscribed.
    ///
    /// Example:
    /// ```ignore
    /// let sub = bus.subscribe::<MovieSaved, _>(|event| {
    ///     println!("Saved: {}", event.title);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // Wrap the typed handler in a type-erased closure
        let wrapped: EventHandler = Arc::new(move |event_any: &dyn Any| {
            if let Some(event) = event_any.downcast_ref::<E>() {
                handler(event);
            } else {
                log::error!(
                    "Failed to downcast event in handler for {}",
                    std::any::type_name::<E>()
                );
            }
        });

        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_default()
            .push((id, wrapped));

        Subscription {
            handlers: Arc::downgrade(&self.handlers),
            type_id,
            id,
            active: true,
        }
    }

    /// Emit an event
    ///
    /// This will:
    /// 1. Log the event
    /// 2. Execute all handlers for this event type (in subscription order)
    /// 3. Return immediately (synchronous)
    ///
    /// If a handler panics, the panic is caught and logged, but other handlers
    /// still execute.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let type_id = TypeId::of::<E>();

        // Snapshot so handlers can touch the registry
        let event_handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        let log_entry = EventLogEntry {
            event_type: event.event_type().to_string(),
            event_id: event.event_id().to_string(),
            occurred_at: event.occurred_at().to_rfc3339(),
            handler_count: event_handlers.len(),
        };

        log::debug!(
            "[EVENT] {} (id: {}) | {} handlers",
            log_entry.event_type,
            log_entry.event_id,
            log_entry.handler_count
        );

        {
            let mut event_log = self.event_log.write().unwrap_or_else(PoisonError::into_inner);
            if event_log.len() == MAX_EVENT_LOG_ENTRIES {
                event_log.pop_front();
            }
            event_log.push_back(log_entry);
        }

        for (idx, handler) in event_handlers.iter().enumerate() {
            // Catch panics to prevent one handler from breaking others
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(&event as &dyn Any);
            }));

            if let Err(e) = result {
                log::error!(
                    "Handler {} for {} panicked: {:?}",
                    idx,
                    event.event_type(),
                    e
                );
            }
        }
    }

    /// Get the event log (for debugging), oldest first
    pub fn get_event_log(&self) -> Vec<EventLogEntry> {
        self.event_log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Clear the event log
    pub fn clear_event_log(&self) {
        self.event_log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get the number of subscribers for a specific event type
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: 'static,
    {
        let type_id = TypeId::of::<E>();
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .map(|h| h.len())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// Make EventBus cloneable (shared reference)
impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            event_log: Arc::clone(&self.event_log),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuthChangeEvent;
    use crate::events::types::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn saved(title: &str) -> MovieSaved {
        MovieSaved::new(Uuid::new_v4(), Uuid::new_v4(), title.to_string(), false)
    }

    #[test]
    fn test_subscribe_and_emit() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let _sub = bus.subscribe::<MovieSaved, _>(move |_event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(saved("Heat"));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_multiple_handlers_execute_in_order() {
        let bus = EventBus::new();
        let sequence = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<Subscription> = (1..=3)
            .map(|n| {
                let seq = Arc::clone(&sequence);
                bus.subscribe::<AuthStateChanged, _>(move |_| {
                    seq.lock().unwrap().push(n);
                })
            })
            .collect();

        bus.emit(AuthStateChanged::new(AuthChangeEvent::SignedIn, None));

        assert_eq!(*sequence.lock().unwrap(), vec![1, 2, 3]);
        drop(subs);
    }

    #[test]
    fn test_dropping_subscription_removes_handler() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let sub = bus.subscribe::<MovieSaved, _>(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bus.subscriber_count::<MovieSaved>(), 1);

        sub.unsubscribe();
        assert_eq!(bus.subscriber_count::<MovieSaved>(), 0);

        bus.emit(saved("Heat"));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_detached_subscription_stays_registered() {
        let bus = EventBus::new();
        bus.subscribe::<MovieSaved, _>(|_| {}).detach();
        assert_eq!(bus.subscriber_count::<MovieSaved>(), 1);
    }

    #[test]
    fn test_event_log_records_emissions() {
        let bus = EventBus::new();

        bus.emit(saved("Heat"));
        bus.emit(NotificationRaised::new(Notification::info("Hi", "there")));

        let log = bus.get_event_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].event_type, "MovieSaved");
        assert_eq!(log[1].event_type, "NotificationRaised");

        bus.clear_event_log();
        assert!(bus.get_event_log().is_empty());
    }

    #[test]
    fn test_event_log_keeps_only_recent_entries() {
        let bus = EventBus::new();

        for n in 0..MAX_EVENT_LOG_ENTRIES + 10 {
            bus.emit(NotificationRaised::new(Notification::info(format!("n{}", n), "")));
        }
        let last = saved("Heat");
        let last_id = last.event_id().to_string();
        bus.emit(last);

        let log = bus.get_event_log();
        assert_eq!(log.len(), MAX_EVENT_LOG_ENTRIES);
        assert_eq!(log.last().map(|e| e.event_id.as_str()), Some(last_id.as_str()));
        assert_eq!(log.last().map(|e| e.event_type.as_str()), Some("MovieSaved"));
    }

    #[test]
    fn test_handler_may_unsubscribe_itself_during_emit() {
        let bus = EventBus::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot_clone = Arc::clone(&slot);

        let sub = bus.subscribe::<MovieSaved, _>(move |_| {
            if let Some(sub) = slot_clone.lock().unwrap().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(sub);

        bus.emit(saved("Heat"));
        assert_eq!(bus.subscriber_count::<MovieSaved>(), 0);
    }

    #[test]
    fn test_handler_panic_doesnt_break_bus() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        // First handler panics
        let _first = bus.subscribe::<MovieSaved, _>(|_| {
            panic!("Intentional panic");
        });

        // Second handler should still execute
        let counter_clone = Arc::clone(&counter);
        let _second = bus.subscribe::<MovieSaved, _>(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(saved("Test"));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
