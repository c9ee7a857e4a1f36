//! Application route table.

use super::guard::{GuardDecision, RouteGuard};
use super::Location;
use crate::session::SessionSnapshot;

/// A screen path and the guards nested around it, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    pub path: &'static str,
    pub guards: &'static [RouteGuard],
}

impl RouteSpec {
    pub fn is_public(&self) -> bool {
        self.guards.is_empty()
    }
}

const PUBLIC: &[RouteGuard] = &[];
const DASHBOARD: &[RouteGuard] = &[RouteGuard {
    require_super_admin: false,
}];
const SUPER_ADMIN: &[RouteGuard] = &[
    RouteGuard {
        require_super_admin: false,
    },
    RouteGuard {
        require_super_admin: true,
    },
];

const HOME: RouteSpec = RouteSpec { path: "/", guards: DASHBOARD };

const ROUTES: &[RouteSpec] = &[
    RouteSpec { path: "/login", guards: PUBLIC },
    RouteSpec { path: "/forgot-password", guards: PUBLIC },
    RouteSpec { path: "/change-password", guards: PUBLIC },
    HOME,
    RouteSpec { path: "/profile", guards: DASHBOARD },
    RouteSpec { path: "/hero", guards: DASHBOARD },
    RouteSpec { path: "/about", guards: DASHBOARD },
    RouteSpec { path: "/services", guards: DASHBOARD },
    RouteSpec { path: "/stats", guards: DASHBOARD },
    RouteSpec { path: "/projects", guards: DASHBOARD },
    RouteSpec { path: "/workflow", guards: DASHBOARD },
    RouteSpec { path: "/partners", guards: DASHBOARD },
    RouteSpec { path: "/testimonials", guards: DASHBOARD },
    RouteSpec { path: "/contact-info", guards: DASHBOARD },
    RouteSpec { path: "/socials", guards: DASHBOARD },
    RouteSpec { path: "/map-url", guards: DASHBOARD },
    RouteSpec { path: "/applications", guards: DASHBOARD },
    RouteSpec { path: "/languages", guards: DASHBOARD },
    RouteSpec { path: "/users", guards: SUPER_ADMIN },
    RouteSpec { path: "/users/new", guards: SUPER_ADMIN },
];

/// The panel's screens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTable;

impl RouteTable {
    pub fn routes(&self) -> &'static [RouteSpec] {
        ROUTES
    }

    /// Match a path; unknown paths fall back to the dashboard home.
    pub fn resolve(&self, path: &str) -> &'static RouteSpec {
        let normalized = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        ROUTES
            .iter()
            .find(|r| r.path == normalized)
            .unwrap_or(&HOME)
    }

    /// Run the guards around `location`'s route, outermost first; the first
    /// one that does not allow decides.
    pub fn authorize(&self, location: &Location, session: &SessionSnapshot) -> GuardDecision {
        let route = self.resolve(&location.pathname);
        route
            .guards
            .iter()
            .map(|guard| guard.check(session, location))
            .find(|decision| !decision.is_allowed())
            .unwrap_or(GuardDecision::Allow)
    }
}
