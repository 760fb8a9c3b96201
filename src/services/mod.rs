// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// Client-side state holders and flows. Collaborators come in through
// constructors as `Arc<dyn Trait>`; nothing here owns a global.

pub mod auth_forms;
pub mod dashboard;
pub mod debounce;
pub mod movie_collection;
pub mod movie_search;
pub mod navigation;
pub mod review_form;
pub mod route_gate;
pub mod session_store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export all services and their types
pub use auth_forms::{
    map_auth_error,
    validate_sign_up,
    AuthFormService,
    FormOutcome,
    SignInForm,
    SignUpForm,
};

pub use dashboard::DashboardService;

pub use debounce::Debouncer;

pub use movie_collection::{
    CollectionState,
    MovieCollection,
};

pub use movie_search::{
    MovieSearchPanel,
    SearchState,
};

pub use navigation::{
    NavigationOutcome,
    Navigator,
    Screen,
};

pub use review_form::{
    ReviewFormState,
    ReviewSubmissionForm,
    SubmitOutcome,
};

pub use route_gate::GateDecision;

pub use session_store::{
    SessionState,
    SessionStore,
    SignOutOutcome,
};
