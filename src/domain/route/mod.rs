// src/domain/route/mod.rs
//
// Application routes and browser-style locations.
//
// Matching only looks at the path; the query string travels with the
// Location so it can be preserved across redirects.

use serde::{Deserialize, Serialize};

pub const SIGN_IN_PATH: &str = "/auth/signin";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Query markers left behind by an OAuth redirect
const OAUTH_MARKERS: [&str; 2] = ["code=", "error="];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Home,
    SignUp,
    SignIn,
    ForgotPassword,
    Dashboard,
    AddMovie,
    Recommendations,
    MyMovies,
    MovieDetail { id: String },
    Profile,
    Settings,
    NotFound,
}

/// Outcome of matching a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Page(Route),
    /// Legacy path, replaced by the target route
    Redirect(Route),
}

impl Route {
    pub fn resolve(path: &str) -> RouteMatch {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };

        let route = match path {
            "/" => Route::Home,
            "/auth/signup" => Route::SignUp,
            "/auth/signin" => Route::SignIn,
            "/auth/forgot-password" => Route::ForgotPassword,
            "/dashboard" => Route::Dashboard,
            "/add-movie" => Route::AddMovie,
            "/recommendations" => Route::Recommendations,
            "/my-movies" => Route::MyMovies,
            "/profile" => Route::Profile,
            "/settings" => Route::Settings,
            "/login" => return RouteMatch::Redirect(Route::SignIn),
            "/register" => return RouteMatch::Redirect(Route::SignUp),
            other => match other.strip_prefix("/movie/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::MovieDetail {
                    id: id.to_string(),
                },
                _ => Route::NotFound,
            },
        };

        RouteMatch::Page(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::SignUp => "/auth/signup".to_string(),
            Route::SignIn => SIGN_IN_PATH.to_string(),
            Route::ForgotPassword => "/auth/forgot-password".to_string(),
            Route::Dashboard => DASHBOARD_PATH.to_string(),
            Route::AddMovie => "/add-movie".to_string(),
            Route::Recommendations => "/recommendations".to_string(),
            Route::MyMovies => "/my-movies".to_string(),
            Route::MovieDetail { id } => format!("/movie/{}", id),
            Route::Profile => "/profile".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Stable snake_case name, used by clients to pick a screen
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::SignUp => "sign_up",
            Route::SignIn => "sign_in",
            Route::ForgotPassword => "forgot_password",
            Route::Dashboard => "dashboard",
            Route::AddMovie => "add_movie",
            Route::Recommendations => "recommendations",
            Route::MyMovies => "my_movies",
            Route::MovieDetail { .. } => "movie_detail",
            Route::Profile => "profile",
            Route::Settings => "settings",
            Route::NotFound => "not_found",
        }
    }

    /// Routes that require a signed-in user
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard
                | Route::AddMovie
                | Route::Recommendations
                | Route::MyMovies
                | Route::MovieDetail { .. }
                | Route::Profile
                | Route::Settings
        )
    }
}

/// A path plus optional query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
        }
    }

    /// Parse "/path?query#fragment"; the fragment is discarded
    pub fn parse(raw: &str) -> Self {
        let without_fragment = raw.split('#').next().unwrap_or_default();
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };

        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
        }
    }

    pub fn has_oauth_markers(&self) -> bool {
        self.query
            .as_deref()
            .map(|q| OAUTH_MARKERS.iter().any(|marker| q.contains(marker)))
            .unwrap_or(false)
    }

    /// Same path with the query dropped when it carries OAuth completion markers
    pub fn without_oauth_markers(&self) -> Self {
        if self.has_oauth_markers() {
            Self::new(self.path.clone())
        } else {
            self.clone()
        }
    }

    pub fn route(&self) -> RouteMatch {
        Route::resolve(&self.path)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.path, query),
            None => write!(f, "{}", self.path),
        }
    }
}
