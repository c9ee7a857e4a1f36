//! Session lifecycle: startup restore, login, logout and profile updates.
//!
//! [`SessionManager`] is the only writer of [`SessionState`] apart from the
//! [`ForcedLogout`] hook the HTTP client fires on a 401.
//!
//! Every operation that awaits the network captures the session generation
//! first and applies its result only if the generation is unchanged, so a
//! slow identity fetch cannot resurrect a session that was logged out while
//! it was in flight.

mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, info, warn};

pub use state::{SessionSnapshot, SessionState};

use crate::api::AuthApi;
use crate::config::ClientConfig;
use crate::http::{ApiClient, ApiError, UnauthorizedHook};
use crate::models::{LoginResponse, ProfileUpdate, User};
use crate::router::{Location, Navigation, Navigator};
use crate::storage::{SecureStorage, StorageBackend, StorageError, keys};

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session changed while the operation was in flight")]
    Superseded,

    #[error("Not authenticated")]
    NotAuthenticated,
}

impl SessionError {
    /// Server-provided message, for display.
    pub fn message(&self) -> Option<&str> {
        match self {
            SessionError::Api(e) => e.message(),
            _ => None,
        }
    }
}

/// Teardown fired by the HTTP client when the server rejects the token.
///
/// Requests are tagged with the session generation; a rejection from before
/// the latest login or logout leaves the current session alone.
pub struct ForcedLogout {
    state: SessionState,
    navigator: Arc<dyn Navigator>,
}

impl ForcedLogout {
    pub fn new(state: SessionState, navigator: Arc<dyn Navigator>) -> Self {
        Self { state, navigator }
    }
}

impl UnauthorizedHook for ForcedLogout {
    fn epoch(&self) -> u64 {
        self.state.generation()
    }

    fn on_unauthorized(&self, epoch: u64, clear: &dyn Fn() -> bool) {
        let torn_down = self.state.teardown_at(epoch, clear);
        if torn_down && !self.navigator.location().is_login() {
            info!("session expired, returning to login");
            self.navigator
                .navigate(Navigation::push(Location::session_expired_login()));
        }
    }
}

/// Owner of the session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    client: ApiClient,
    storage: SecureStorage,
    state: SessionState,
    started: Arc<AtomicBool>,
}

impl SessionManager {
    /// Assemble a manager from parts. `client` should have been built with a
    /// [`ForcedLogout`] hook over the same `state`.
    pub fn new(client: ApiClient, storage: SecureStorage, state: SessionState) -> Self {
        Self {
            client,
            storage,
            state,
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build storage, state, the forced-logout hook and the client, wired
    /// together.
    pub fn bootstrap(
        config: &ClientConfig,
        backend: Arc<dyn StorageBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SessionError> {
        let storage = SecureStorage::new(backend, &config.crypto_secret)?;
        let state = SessionState::new();
        let hook = Arc::new(ForcedLogout::new(state.clone(), navigator));
        let client = ApiClient::new(config, storage.clone(), hook)?;
        Ok(Self::new(client, storage, state))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn storage(&self) -> &SecureStorage {
        &self.storage
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.client)
    }

    /// Resolve the persisted session at startup.
    ///
    /// Runs once; the loading flag drops exactly once at the end whatever
    /// the outcome. Later calls return the current snapshot untouched.
    pub async fn initialize(&self) -> SessionSnapshot {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("session already initialized");
            return self.state.snapshot();
        }

        let epoch = self.state.generation();
        if self.storage.get::<String>(keys::ACCESS_TOKEN).is_some() {
            match self.auth().me().await {
                Ok(user) => {
                    let restored = self.state.commit(epoch, |slot| {
                        self.storage.set(keys::USER_DATA, &user);
                        *slot = Some(user);
                    });
                    if restored.is_some() {
                        info!("session restored");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "stored session rejected, clearing credentials");
                    self.state.commit(epoch, |slot| {
                        *slot = None;
                        self.storage.clear_all();
                    });
                }
            }
        } else {
            debug!("no stored session");
        }

        self.state.finish_loading();
        self.state.snapshot()
    }

    /// Authenticate and load the profile.
    ///
    /// Succeeds only once both the token and the profile are persisted; any
    /// failure after the token was written removes it again.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let epoch = self.state.advance();
        let LoginResponse { access_token } = self.auth().login(email, password).await?;

        self.state
            .commit(epoch, |_| self.storage.try_set(keys::ACCESS_TOKEN, &access_token))
            .ok_or(SessionError::Superseded)??;

        let user = match self.auth().me().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "identity fetch failed after login, rolling back token");
                self.rollback(epoch);
                return Err(e.into());
            }
        };

        match self.apply_profile(epoch, user.clone(), false) {
            Ok(()) => {
                info!(user_id = %user.id, role = %user.role, "logged in");
                Ok(user)
            }
            Err(SessionError::Superseded) => Err(SessionError::Superseded),
            Err(e) => {
                self.rollback(epoch);
                Err(e)
            }
        }
    }

    /// Sign out locally, telling the server on a best-effort basis.
    pub async fn logout(&self) {
        self.state.advance();
        if let Err(e) = self.auth().logout().await {
            debug!(error = %e, "logout request failed, clearing session anyway");
        }
        self.state.teardown(|| self.storage.clear_all());
        info!("logged out");
    }

    /// Replace the profile with a server-confirmed copy. The token is untouched.
    pub fn update_profile(&self, user: User) -> Result<(), SessionError> {
        self.apply_profile(self.state.generation(), user, true)
    }

    /// Send profile edits to the server and adopt the returned record.
    pub async fn save_profile(&self, update: ProfileUpdate) -> Result<User, SessionError> {
        let epoch = self.state.generation();
        if !self.state.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        let user = self.auth().update_me(update).await?;
        self.apply_profile(epoch, user.clone(), true)?;
        Ok(user)
    }

    /// Re-fetch the current identity.
    pub async fn refresh(&self) -> Result<User, SessionError> {
        let epoch = self.state.generation();
        if !self.state.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        let user = self.auth().me().await?;
        self.apply_profile(epoch, user.clone(), true)?;
        Ok(user)
    }

    /// Persist and set `user` if `epoch` is still current. With
    /// `require_session`, an anonymous session is left alone.
    fn apply_profile(
        &self,
        epoch: u64,
        user: User,
        require_session: bool,
    ) -> Result<(), SessionError> {
        self.state
            .commit(epoch, |slot| -> Result<(), SessionError> {
                if require_session && slot.is_none() {
                    return Err(SessionError::NotAuthenticated);
                }
                self.storage.try_set(keys::USER_DATA, &user)?;
                *slot = Some(user);
                Ok(())
            })
            .ok_or(SessionError::Superseded)?
    }

    /// Undo a half-finished login, unless a newer operation owns the store.
    fn rollback(&self, epoch: u64) {
        self.state.commit(epoch, |slot| {
            *slot = None;
            self.storage.remove(keys::ACCESS_TOKEN);
            self.storage.remove(keys::USER_DATA);
        });
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("client", &self.client)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
