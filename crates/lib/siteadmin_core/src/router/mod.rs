//! Navigation primitives and route protection.
//!
//! A [`Navigator`] stands in for the browser location: the forced-logout
//! path and the route guard both move the user through it.

mod guard;
mod routes;

use std::sync::Mutex;

pub use guard::{GuardDecision, RouteGuard};
pub use routes::{RouteSpec, RouteTable};

/// Path of the login screen.
pub const LOGIN_PATH: &str = "/login";

/// Query marker appended when the server rejected the session.
pub const SESSION_EXPIRED_PARAM: &str = "session_expired";

/// A path plus optional query string, e.g. `/login?session_expired=true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    /// Query string without the leading `?`.
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self::parse(&pathname.into())
    }

    /// Split `"/path?query"` into its parts. Paths always start with `/`.
    pub fn parse(raw: &str) -> Self {
        let (path, search) = raw.split_once('?').unwrap_or((raw, ""));
        let path = path.trim();
        let pathname = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            pathname,
            search: search.to_string(),
        }
    }

    /// The login screen with the session-expired marker.
    pub fn session_expired_login() -> Self {
        Self {
            pathname: LOGIN_PATH.into(),
            search: format!("{SESSION_EXPIRED_PARAM}=true"),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.search
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Whether the login screen should show the session-expired notice.
    pub fn is_session_expired(&self) -> bool {
        self.query_param(SESSION_EXPIRED_PARAM) == Some("true")
    }

    pub fn is_login(&self) -> bool {
        self.pathname == LOGIN_PATH
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.search.is_empty() {
            f.write_str(&self.pathname)
        } else {
            write!(f, "{}?{}", self.pathname, self.search)
        }
    }
}

/// A requested move, with the location to come back to after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub to: Location,
    pub from: Option<Location>,
    /// Replace the current history entry instead of pushing.
    pub replace: bool,
}

impl Navigation {
    pub fn push(to: Location) -> Self {
        Self {
            to,
            from: None,
            replace: false,
        }
    }

    pub fn replace(to: Location) -> Self {
        Self {
            to,
            from: None,
            replace: true,
        }
    }
}

/// Where the user is and how to move them.
pub trait Navigator: Send + Sync {
    fn location(&self) -> Location;

    fn navigate(&self, navigation: Navigation);
}

/// Where to go after a successful login: the preserved location or home.
pub fn post_login_target(from: Option<&Location>) -> Location {
    match from {
        Some(loc) if !loc.is_login() => loc.clone(),
        _ => Location::new("/"),
    }
}

/// In-memory history stack.
#[derive(Debug)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<Navigation>>,
}

impl HistoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![Navigation::push(Location::new(start))]),
        }
    }

    /// The navigation that produced the current location.
    pub fn current(&self) -> Navigation {
        let entries = self.lock();
        entries
            .last()
            .cloned()
            .unwrap_or_else(|| Navigation::push(Location::new("/")))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Navigation>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HistoryNavigator {
    fn location(&self) -> Location {
        self.current().to
    }

    fn navigate(&self, navigation: Navigation) {
        let mut entries = self.lock();
        if navigation.replace {
            entries.pop();
        }
        entries.push(navigation);
    }
}
