//! Encrypted persistent key/value storage for session credentials.
//!
//! Every value is JSON-serialized and sealed with AES-256-GCM before it
//! reaches the [`StorageBackend`]. Reads never fail on bad data: an entry
//! that cannot be decrypted or parsed is reported as absent.

mod backend;
mod cipher;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{error, warn};

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
use cipher::EnvelopeCipher;

/// Well-known storage keys.
pub mod keys {
    /// Session bearer token (a JSON string).
    pub const ACCESS_TOKEN: &str = "tr_access_token";
    /// Cached user profile (a JSON object).
    pub const USER_DATA: &str = "tr_user_data";
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Key-agnostic encrypted store over a durable backend.
#[derive(Clone)]
pub struct SecureStorage {
    backend: Arc<dyn StorageBackend>,
    cipher: Arc<EnvelopeCipher>,
}

impl SecureStorage {
    pub fn new(backend: Arc<dyn StorageBackend>, secret: &str) -> Result<Self, StorageError> {
        Ok(Self {
            backend,
            cipher: Arc::new(EnvelopeCipher::new(secret)?),
        })
    }

    /// Serialize, encrypt and write `value`. Failures are logged, never raised.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            error!(key, error = %e, "secure storage set failed");
        }
    }

    /// Fallible form of [`set`](Self::set).
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".into()));
        }
        let json = serde_json::to_string(value)?;
        let sealed = self.cipher.seal(&json)?;
        self.backend.write(key, &sealed)?;
        Ok(())
    }

    /// Read and decrypt `key`. Absent, corrupted and unreadable entries are all `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                error!(key, error = %e, "secure storage get failed");
                None
            }
        }
    }

    /// Like [`get`](Self::get), but a failure of the backend read itself is
    /// returned as an error. Corrupted or tampered entries are still `Ok(None)`.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(sealed) = self.backend.read(key)? else {
            return Ok(None);
        };
        Ok(self.decode(key, &sealed))
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, sealed: &str) -> Option<T> {
        let plaintext = match self.cipher.open(sealed) {
            Ok(p) if !p.is_empty() => p,
            Ok(_) => return None,
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable storage entry");
                return None;
            }
        };
        match serde_json::from_str(&plaintext) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "discarding unparseable storage entry");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.delete(key) {
            error!(key, error = %e, "secure storage remove failed");
        }
    }

    /// Delete every entry in the namespace, not only the session keys.
    pub fn clear_all(&self) {
        if let Err(e) = self.backend.clear() {
            error!(error = %e, "secure storage clear failed");
        }
    }
}

impl std::fmt::Debug for SecureStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: String,
        role: String,
    }

    fn storage() -> (Arc<MemoryBackend>, SecureStorage) {
        let backend = Arc::new(MemoryBackend::new());
        let storage = SecureStorage::new(backend.clone(), "unit-test-secret").unwrap();
        (backend, storage)
    }

    #[test]
    fn round_trip_string_and_struct() {
        let (_, storage) = storage();
        storage.set(keys::ACCESS_TOKEN, "T1");
        let profile = Profile {
            id: "1".into(),
            role: "admin".into(),
        };
        storage.set(keys::USER_DATA, &profile);

        assert_eq!(storage.get::<String>(keys::ACCESS_TOKEN).as_deref(), Some("T1"));
        assert_eq!(storage.get::<Profile>(keys::USER_DATA), Some(profile));
    }

    #[test]
    fn values_never_hit_the_backend_in_plaintext() {
        let (backend, storage) = storage();
        storage.set(keys::ACCESS_TOKEN, "super-secret-token");
        let raw = backend.entries();
        let stored = raw.get(keys::ACCESS_TOKEN).unwrap();
        assert!(!stored.contains("super-secret-token"));
    }

    #[test]
    fn missing_key_is_none() {
        let (_, storage) = storage();
        assert_eq!(storage.get::<String>("nope"), None);
        assert!(storage.try_get::<String>("nope").unwrap().is_none());
    }

    #[test]
    fn garbage_entry_reads_as_absent() {
        let (backend, storage) = storage();
        backend.write(keys::ACCESS_TOKEN, "garbage!!").unwrap();
        assert_eq!(storage.get::<String>(keys::ACCESS_TOKEN), None);
        assert!(storage.try_get::<String>(keys::ACCESS_TOKEN).unwrap().is_none());
    }

    #[test]
    fn entry_sealed_under_another_secret_reads_as_absent() {
        let (backend, storage) = storage();
        let other = SecureStorage::new(backend.clone(), "another-secret").unwrap();
        other.set(keys::ACCESS_TOKEN, "T1");
        assert_eq!(storage.get::<String>(keys::ACCESS_TOKEN), None);
    }

    #[test]
    fn wrong_shape_reads_as_absent() {
        let (_, storage) = storage();
        storage.set(keys::USER_DATA, "just a string");
        assert_eq!(storage.get::<Profile>(keys::USER_DATA), None);
    }

    #[test]
    fn clear_all_removes_unrelated_keys_too() {
        let (backend, storage) = storage();
        storage.set(keys::ACCESS_TOKEN, "T1");
        storage.set("ui_prefs", &serde_json::json!({"theme": "dark"}));
        storage.clear_all();
        assert!(backend.is_empty());
    }

    #[test]
    fn remove_deletes_single_entry() {
        let (_, storage) = storage();
        storage.set(keys::ACCESS_TOKEN, "T1");
        storage.set(keys::USER_DATA, &serde_json::json!({}));
        storage.remove(keys::ACCESS_TOKEN);
        assert_eq!(storage.get::<String>(keys::ACCESS_TOKEN), None);
        assert!(storage.get::<serde_json::Value>(keys::USER_DATA).is_some());
    }

    struct BrokenBackend;

    impl StorageBackend for BrokenBackend {
        fn read(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::other("disk on fire"))
        }
        fn write(&self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::other("disk on fire"))
        }
        fn delete(&self, _key: &str) -> io::Result<()> {
            Err(io::Error::other("disk on fire"))
        }
        fn clear(&self) -> io::Result<()> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn backend_failures_are_swallowed_by_lenient_api() {
        let storage = SecureStorage::new(Arc::new(BrokenBackend), "s").unwrap();
        storage.set(keys::ACCESS_TOKEN, "T1");
        storage.remove(keys::ACCESS_TOKEN);
        storage.clear_all();
        assert_eq!(storage.get::<String>(keys::ACCESS_TOKEN), None);
    }

    #[test]
    fn backend_failures_surface_through_strict_api() {
        let storage = SecureStorage::new(Arc::new(BrokenBackend), "s").unwrap();
        assert!(matches!(
            storage.try_get::<String>(keys::ACCESS_TOKEN),
            Err(StorageError::Io(_))
        ));
        assert!(storage.try_set(keys::ACCESS_TOKEN, "T1").is_err());
    }
}
