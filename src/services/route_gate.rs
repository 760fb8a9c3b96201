// src/services/route_gate.rs
//
// Route gate - decides what a protected route shows for a session state

use serde::Serialize;

use crate::domain::{Location, SIGN_IN_PATH};
use crate::services::session_store::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// Session not resolved yet; show a loading indicator
    Loading,
    /// Replace the current entry with `to`, remembering `from`
    Redirect { to: Location, from: Location },
    Render,
}

pub fn evaluate(state: &SessionState, requested: &Location) -> GateDecision {
    if state.loading {
        return GateDecision::Loading;
    }
    if state.user.is_none() {
        return GateDecision::Redirect {
            to: Location::new(SIGN_IN_PATH),
            from: requested.clone(),
        };
    }
    GateDecision::Render
}
