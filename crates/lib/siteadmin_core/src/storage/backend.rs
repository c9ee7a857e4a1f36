//! Durable key/value media behind [`SecureStorage`](super::SecureStorage).

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

/// A raw key/value medium. Values are opaque strings; encryption happens
/// above this layer.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> io::Result<()>;

    fn delete(&self, key: &str) -> io::Result<()>;

    /// Remove every entry in the namespace.
    fn clear(&self) -> io::Result<()>;
}

/// One file per key inside a namespace directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) the namespace directory.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened file storage");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> io::Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key: {key:?}"),
            ));
        }
        Ok(self.dir.join(key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.entry_path(key)?) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn clear(&self) -> io::Result<()> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// Keys double as file names, so keep them to a portable character set.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// In-memory medium for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all raw (encrypted) entries.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backend_write_read_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(tmp.path().join("ns")).unwrap();

        assert_eq!(backend.read("tr_access_token").unwrap(), None);
        backend.write("tr_access_token", "abc").unwrap();
        assert_eq!(
            backend.read("tr_access_token").unwrap(),
            Some("abc".to_string())
        );

        backend.delete("tr_access_token").unwrap();
        assert_eq!(backend.read("tr_access_token").unwrap(), None);
        // Deleting a missing key is fine.
        backend.delete("tr_access_token").unwrap();
    }

    #[test]
    fn file_backend_clear_removes_every_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(tmp.path()).unwrap();
        backend.write("a", "1").unwrap();
        backend.write("b", "2").unwrap();
        backend.write("unrelated", "3").unwrap();

        backend.clear().unwrap();
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn file_backend_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(tmp.path()).unwrap();
        assert!(backend.write("../escape", "x").is_err());
        assert!(backend.write("", "x").is_err());
        assert!(backend.read(".hidden").is_err());
    }

    #[test]
    fn memory_backend_clear() {
        let backend = MemoryBackend::new();
        backend.write("k", "v").unwrap();
        assert!(!backend.is_empty());
        backend.clear().unwrap();
        assert!(backend.is_empty());
    }
}
