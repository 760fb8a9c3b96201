// src/services/navigation.rs
//
// Navigator - the client's current location and route resolution
//
// Legacy paths are rewritten first, then protected routes pass the gate.
// Every change of location replaces the current entry.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::{Location, Route, RouteMatch};
use crate::services::route_gate::{self, GateDecision};
use crate::services::session_store::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "route", rename_all = "snake_case")]
pub enum Screen {
    Loading,
    Page(Route),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationOutcome {
    pub location: Location,
    pub screen: Screen,
    /// Protected location the user was bounced away from
    pub redirected_from: Option<Location>,
}

pub struct Navigator {
    current: watch::Sender<Location>,
    return_to: Mutex<Option<Location>>,
}

impl Navigator {
    pub fn new(initial: Location) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current,
            return_to: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Location {
        self.current.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Location> {
        self.current.subscribe()
    }

    /// Resolve `raw` against the session and move there
    pub fn navigate(&self, raw: &str, session: &SessionState) -> NavigationOutcome {
        let requested = Location::parse(raw);

        let (location, route) = match requested.route() {
            RouteMatch::Page(route) => (requested, route),
            RouteMatch::Redirect(route) => {
                log::debug!("Legacy path {} -> {}", requested, route.path());
                (Location::new(route.path()), route)
            }
        };

        if !route.is_protected() {
            return self.settle(location, Screen::Page(route), None);
        }

        match route_gate::evaluate(session, &location) {
            GateDecision::Loading => self.settle(location, Screen::Loading, None),
            GateDecision::Render => self.settle(location, Screen::Page(route), None),
            GateDecision::Redirect { to, from } => {
                *self.return_to.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(from.clone());
                let screen = match to.route() {
                    RouteMatch::Page(target) | RouteMatch::Redirect(target) => Screen::Page(target),
                };
                self.settle(to, screen, Some(from))
            }
        }
    }

    /// Re-evaluate the current location, e.g. once the session resolved
    pub fn refresh(&self, session: &SessionState) -> NavigationOutcome {
        self.navigate(&self.current().to_string(), session)
    }

    /// Drop OAuth completion markers from the current location.
    /// Returns true when the location changed.
    pub fn strip_oauth_markers(&self) -> bool {
        self.current.send_if_modified(|location| {
            if location.has_oauth_markers() {
                *location = location.without_oauth_markers();
                true
            } else {
                false
            }
        })
    }

    /// The location a sign-in redirect interrupted, if any
    pub fn take_return_to(&self) -> Option<Location> {
        self.return_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn settle(
        &self,
        location: Location,
        screen: Screen,
        redirected_from: Option<Location>,
    ) -> NavigationOutcome {
        self.current.send_replace(location.clone());
        NavigationOutcome {
            location,
            screen,
            redirected_from,
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Location::new("/"))
    }
}
