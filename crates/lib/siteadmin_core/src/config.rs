//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default API base address.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default storage secret. Bundled with the client, so it only obfuscates.
pub const DEFAULT_CRYPTO_SECRET: &str = "fallback_secret_key";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the API client and credential store.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL every API path is appended to (e.g. `http://host/api/v1`).
    pub api_url: String,
    /// Secret the storage encryption key is derived from.
    pub crypto_secret: String,
    /// Namespace directory for persisted entries.
    pub storage_dir: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                                  |
    /// |--------------------------|------------------------------------------|
    /// | `API_URL`                | `http://localhost:8000/api/v1`           |
    /// | `CRYPTO_SECRET`          | `fallback_secret_key`                    |
    /// | `SITEADMIN_STORAGE_DIR`  | `<data dir>/siteadmin/storage`           |
    /// | `SITEADMIN_TIMEOUT_SECS` | `30`                                     |
    pub fn from_env() -> Self {
        Self {
            api_url: non_empty_var("API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            crypto_secret: non_empty_var("CRYPTO_SECRET")
                .unwrap_or_else(|| DEFAULT_CRYPTO_SECRET.into()),
            storage_dir: non_empty_var("SITEADMIN_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_storage_dir),
            timeout: non_empty_var("SITEADMIN_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            crypto_secret: DEFAULT_CRYPTO_SECRET.into(),
            storage_dir: default_storage_dir(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// `<data dir>/siteadmin/storage`, falling back to the working directory.
pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("siteadmin")
        .join("storage")
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_api() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.storage_dir.ends_with("siteadmin/storage"));
    }
}
