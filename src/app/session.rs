//! Single-secret admin session gate.
//!
//! The gate is a small state machine:
//!
//! ```text
//!            resolve()            login(secret == configured)
//! Resolving ───────────► Anonymous ─────────────────────────► Authenticated
//!     │                      ▲                                     │
//!     └── marker "true" ─────┼─────────────────────────────────────┤
//!                            └──────────────── logout() ───────────┘
//! ```
//!
//! Authentication state survives a reload through a session-scoped marker
//! stored under [`SESSION_MARKER_KEY`]. One shared secret gates one admin
//! role; there is no expiry and no per-user identity. This is a known
//! limitation of a single-operator site, not a security boundary.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::domain::error::Result;

/// Key of the session marker.
pub const SESSION_MARKER_KEY: &str = "is-authenticated";

/// Value of the marker for an authenticated session.
const MARKER_AUTHENTICATED: &str = "true";

/// Session-scoped key/value storage holding the marker.
pub trait SessionStorage: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is not accessible.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is not accessible.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is not accessible.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process session storage. Clones share the same entries, which is how a
/// reload is simulated: a new gate over a clone sees the same marker.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Authentication status reported by the gate.
///
/// `Resolving` is distinct from `Anonymous`: consumers must wait for it to
/// settle instead of treating it as logged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Resolving,
    Anonymous,
    Authenticated,
}

/// Binary admin gate over a [`SessionStorage`] marker.
pub struct SessionGate {
    storage: Arc<dyn SessionStorage>,
    secret: String,
    status: AuthStatus,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    /// Creates an unresolved gate checking credentials against `secret`.
    pub fn new(storage: Arc<dyn SessionStorage>, secret: impl Into<String>) -> Self {
        Self {
            storage,
            secret: secret.into(),
            status: AuthStatus::Resolving,
        }
    }

    #[must_use]
    pub const fn status(&self) -> AuthStatus {
        self.status
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    /// Settles the initial state from the stored marker.
    ///
    /// Synchronous and network-free. An unreadable storage resolves to
    /// anonymous.
    pub fn resolve(&mut self) -> AuthStatus {
        self.status = match self.storage.get(SESSION_MARKER_KEY) {
            Ok(Some(value)) if value == MARKER_AUTHENTICATED => AuthStatus::Authenticated,
            Ok(_) => AuthStatus::Anonymous,
            Err(e) => {
                tracing::error!(error = %e, "could not read session marker");
                AuthStatus::Anonymous
            }
        };

        tracing::debug!(status = ?self.status, "session resolved");
        self.status
    }

    /// Checks `credential` against the shared secret.
    ///
    /// On an exact match the marker is persisted and the gate becomes
    /// authenticated. Returns whether the login succeeded.
    pub fn login(&mut self, credential: &str) -> bool {
        if credential != self.secret {
            tracing::debug!("login rejected");
            return false;
        }

        if let Err(e) = self.storage.set(SESSION_MARKER_KEY, MARKER_AUTHENTICATED) {
            tracing::warn!(error = %e, "could not persist session marker");
        }
        self.status = AuthStatus::Authenticated;
        tracing::debug!("login accepted");
        true
    }

    /// Clears the marker and returns to anonymous.
    pub fn logout(&mut self) {
        if let Err(e) = self.storage.remove(SESSION_MARKER_KEY) {
            tracing::warn!(error = %e, "could not clear session marker");
        }
        self.status = AuthStatus::Anonymous;
        tracing::debug!("logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FolioError;

    fn gate(storage: &MemorySessionStorage) -> SessionGate {
        SessionGate::new(Arc::new(storage.clone()), "password")
    }

    #[test]
    fn starts_resolving_until_resolved() {
        let storage = MemorySessionStorage::new();
        let mut gate = gate(&storage);
        assert_eq!(gate.status(), AuthStatus::Resolving);
        assert!(!gate.is_authenticated());

        assert_eq!(gate.resolve(), AuthStatus::Anonymous);
    }

    #[test]
    fn correct_secret_authenticates_and_survives_reload() {
        let storage = MemorySessionStorage::new();
        let mut first = gate(&storage);
        first.resolve();

        assert!(!first.login("Password"));
        assert_eq!(first.status(), AuthStatus::Anonymous);

        assert!(first.login("password"));
        assert!(first.is_authenticated());
        assert_eq!(storage.get(SESSION_MARKER_KEY).unwrap().as_deref(), Some("true"));

        let mut reloaded = gate(&storage);
        assert_eq!(reloaded.resolve(), AuthStatus::Authenticated);
    }

    #[test]
    fn logout_clears_marker_for_next_reload() {
        let storage = MemorySessionStorage::new();
        let mut session = gate(&storage);
        session.resolve();
        session.login("password");
        session.logout();

        assert_eq!(session.status(), AuthStatus::Anonymous);
        assert_eq!(storage.get(SESSION_MARKER_KEY).unwrap(), None);
        assert_eq!(gate(&storage).resolve(), AuthStatus::Anonymous);
    }

    #[test]
    fn marker_must_be_exactly_true() {
        let storage = MemorySessionStorage::new();
        storage.set(SESSION_MARKER_KEY, "yes").unwrap();
        assert_eq!(gate(&storage).resolve(), AuthStatus::Anonymous);
    }

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(FolioError::Config("storage disabled".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(FolioError::Config("storage disabled".into()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(FolioError::Config("storage disabled".into()))
        }
    }

    #[test]
    fn unreadable_storage_resolves_anonymous() {
        let mut gate = SessionGate::new(Arc::new(BrokenStorage), "password");
        assert_eq!(gate.resolve(), AuthStatus::Anonymous);

        // Login still flips the in-memory state for this session.
        assert!(gate.login("password"));
        assert!(gate.is_authenticated());
    }
}
