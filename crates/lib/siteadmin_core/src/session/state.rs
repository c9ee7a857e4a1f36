//! Process-wide session state.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::debug;

use crate::models::User;

/// Point-in-time view of the session. Role flags are derived, never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_loading: bool,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_super_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_super_admin)
    }
}

#[derive(Debug)]
struct Inner {
    user: Option<User>,
    is_loading: bool,
    /// Bumped by login, logout and forced teardown; async results captured
    /// under an older generation are dropped.
    generation: u64,
}

/// Shared handle to the single session. Clones point at the same state.
///
/// Mutation is crate-private: only the session manager and the forced
/// logout hook write to it.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionState {
    /// A fresh state in the initializing phase.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(SessionSnapshot {
            user: None,
            is_loading: true,
        });
        Self {
            inner: Arc::new(Mutex::new(Inner {
                user: None,
                is_loading: true,
                generation: 0,
            })),
            notify: Arc::new(notify),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            user: inner.user.clone(),
            is_loading: inner.is_loading,
        }
    }

    /// Receive a new snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.notify.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().user.is_some()
    }

    pub fn is_super_admin(&self) -> bool {
        self.lock().user.as_ref().is_some_and(User::is_super_admin)
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Start a new generation, invalidating every in-flight operation.
    pub(crate) fn advance(&self) -> u64 {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.generation
    }

    /// Run `apply` under the state lock if `generation` is still current.
    /// Returns `None` when the caller's result is stale.
    pub(crate) fn commit<R>(
        &self,
        generation: u64,
        apply: impl FnOnce(&mut Option<User>) -> R,
    ) -> Option<R> {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(
                stale = generation,
                current = inner.generation,
                "discarding stale session result"
            );
            return None;
        }
        let result = apply(&mut inner.user);
        self.publish(&inner);
        Some(result)
    }

    /// Drop the profile and start a new generation. `also` runs under the
    /// lock so persisted state is cleared in the same step.
    pub(crate) fn teardown(&self, also: impl FnOnce()) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.user = None;
        also();
        self.publish(&inner);
    }

    /// Forced teardown for a rejection observed at `generation`.
    ///
    /// Nothing happens if the generation moved on or `clear` declines; the
    /// newer session stays intact. Returns whether the session was torn down.
    pub(crate) fn teardown_at(&self, generation: u64, clear: impl FnOnce() -> bool) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(
                stale = generation,
                current = inner.generation,
                "ignoring rejection from an earlier session"
            );
            return false;
        }
        if !clear() {
            return false;
        }
        inner.generation += 1;
        inner.user = None;
        self.publish(&inner);
        true
    }

    /// Leave the initializing phase. Returns `false` if it already ended.
    pub(crate) fn finish_loading(&self) -> bool {
        let mut inner = self.lock();
        if !inner.is_loading {
            return false;
        }
        inner.is_loading = false;
        self.publish(&inner);
        true
    }

    fn publish(&self, inner: &Inner) {
        self.notify.send_replace(SessionSnapshot {
            user: inner.user.clone(),
            is_loading: inner.is_loading,
        });
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("SessionState")
            .field("authenticated", &inner.user.is_some())
            .field("is_loading", &inner.is_loading)
            .field("generation", &inner.generation)
            .finish()
    }
}
