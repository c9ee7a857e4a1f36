//! # siteadmin_core
//!
//! Client core for the site administration panel: encrypted credential
//! storage, the token-gated HTTP client, the session lifecycle and route
//! protection.

pub mod api;
pub mod config;
pub mod http;
pub mod models;
pub mod router;
pub mod session;
pub mod storage;
pub mod validation;

pub use config::ClientConfig;
pub use http::{ApiClient, ApiError, UnauthorizedHook};
pub use router::{GuardDecision, Location, Navigator, RouteGuard, RouteTable};
pub use session::{SessionError, SessionManager, SessionSnapshot, SessionState};
pub use storage::{SecureStorage, StorageBackend, StorageError};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
