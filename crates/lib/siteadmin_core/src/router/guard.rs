//! Route guard for protected screens.

use tracing::debug;

use super::{LOGIN_PATH, Location, Navigation, Navigator};
use crate::session::SessionSnapshot;

/// Outcome of checking a protected route against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving: show a blocking loader, do not redirect.
    Loading,
    /// Not signed in: go to login, remembering where the user was headed.
    Redirect(Navigation),
    /// Signed in without the required role: deny in place.
    AccessDenied,
    Allow,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Gate in front of a protected view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteGuard {
    pub require_super_admin: bool,
}

impl RouteGuard {
    /// Any signed-in administrator.
    pub fn authenticated() -> Self {
        Self {
            require_super_admin: false,
        }
    }

    pub fn super_admin() -> Self {
        Self {
            require_super_admin: true,
        }
    }

    pub fn check(&self, session: &SessionSnapshot, requested: &Location) -> GuardDecision {
        if session.is_loading {
            return GuardDecision::Loading;
        }
        if !session.is_authenticated() {
            return GuardDecision::Redirect(Navigation {
                to: Location::new(LOGIN_PATH),
                from: Some(requested.clone()),
                replace: true,
            });
        }
        if self.require_super_admin && !session.is_super_admin() {
            return GuardDecision::AccessDenied;
        }
        GuardDecision::Allow
    }

    /// [`check`](Self::check), performing the redirect when one is due.
    pub fn enforce(&self, session: &SessionSnapshot, navigator: &dyn Navigator) -> GuardDecision {
        let requested = navigator.location();
        let decision = self.check(session, &requested);
        if let GuardDecision::Redirect(navigation) = &decision {
            debug!(from = %requested, "redirecting anonymous user to login");
            navigator.navigate(navigation.clone());
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};
    use crate::router::HistoryNavigator;

    fn user(role: Role) -> User {
        User {
            id: "1".into(),
            full_name: "A".into(),
            email: "a@b.com".into(),
            phone: String::new(),
            role,
            profile_image: None,
        }
    }

    fn snapshot(user: Option<User>, is_loading: bool) -> SessionSnapshot {
        SessionSnapshot { user, is_loading }
    }

    #[test]
    fn loading_renders_loader_without_redirect() {
        let nav = HistoryNavigator::new("/users");
        let decision = RouteGuard::super_admin().enforce(&snapshot(None, true), &nav);
        assert_eq!(decision, GuardDecision::Loading);
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn anonymous_redirects_to_login_preserving_origin() {
        let nav = HistoryNavigator::new("/projects?page=2");
        let decision = RouteGuard::authenticated().enforce(&snapshot(None, false), &nav);

        let GuardDecision::Redirect(navigation) = decision else {
            panic!("expected redirect, got {decision:?}");
        };
        assert_eq!(navigation.to.pathname, "/login");
        assert_eq!(navigation.from, Some(Location::parse("/projects?page=2")));
        assert!(navigation.replace);
        assert_eq!(nav.location().pathname, "/login");
        assert_eq!(nav.current().from, Some(Location::parse("/projects?page=2")));
    }

    #[test]
    fn standard_admin_is_denied_in_place() {
        let nav = HistoryNavigator::new("/users");
        let decision =
            RouteGuard::super_admin().enforce(&snapshot(Some(user(Role::Admin)), false), &nav);
        assert_eq!(decision, GuardDecision::AccessDenied);
        assert_eq!(nav.location().pathname, "/users");
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn super_admin_passes_privileged_guard() {
        let decision = RouteGuard::super_admin().check(
            &snapshot(Some(user(Role::SuperAdmin)), false),
            &Location::new("/users"),
        );
        assert!(decision.is_allowed());
    }

    #[test]
    fn standard_admin_passes_plain_guard() {
        let decision = RouteGuard::authenticated().check(
            &snapshot(Some(user(Role::Admin)), false),
            &Location::new("/services"),
        );
        assert_eq!(decision, GuardDecision::Allow);
    }
}
