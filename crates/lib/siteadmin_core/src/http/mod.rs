//! Token-gated HTTP client for the site API.
//!
//! Every request passes through two interceptors:
//!
//! - **outbound**: the session token is read from [`SecureStorage`] and
//!   attached as `Authorization: Bearer <token>`. A storage read *error*
//!   aborts the request; an absent token sends it unauthenticated.
//! - **inbound**: a 401 from any endpoint clears all persisted storage and
//!   fires the injected [`UnauthorizedHook`] before the error is returned.
//!   A 401 for a token that is no longer the stored one is stale and
//!   changes nothing.
//!
//! Nothing is retried.

mod error;

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

pub use error::{ApiError, ApiResult};

use crate::config::ClientConfig;
use crate::storage::{SecureStorage, keys};

/// Reaction to a server-side rejection of the session token.
///
/// Injected into the client at construction so the HTTP layer can tear down
/// session state without depending on it.
pub trait UnauthorizedHook: Send + Sync {
    /// Tag recorded on every request as it is sent.
    fn epoch(&self) -> u64 {
        0
    }

    /// A request sent at `epoch` came back 401.
    ///
    /// `clear` wipes persisted storage if the rejected token is still the
    /// stored one, and reports whether it did. Implementations call it at
    /// most once.
    fn on_unauthorized(&self, epoch: u64, clear: &dyn Fn() -> bool);
}

/// Hook that only performs the storage clear.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl UnauthorizedHook for NoopHook {
    fn on_unauthorized(&self, _epoch: u64, clear: &dyn Fn() -> bool) {
        clear();
    }
}

/// Shared HTTP client. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    storage: SecureStorage,
    hook: Arc<dyn UnauthorizedHook>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        storage: SecureStorage,
        hook: Arc<dyn UnauthorizedHook>,
    ) -> ApiResult<Self> {
        let base_url = Url::parse(&config.api_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            storage,
            hook,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn storage(&self) -> &SecureStorage {
        &self.storage
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::DELETE, path)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    /// `POST` a multipart form; the form sets its own content type.
    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ApiResult<T> {
        self.send(self.request(Method::POST, path).multipart(form))
            .await
    }

    /// `PUT` a multipart form; the form sets its own content type.
    pub async fn put_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ApiResult<T> {
        self.send(self.request(Method::PUT, path).multipart(form))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let body = self.dispatch(builder).await?;
        decode_body(&body)
    }

    async fn dispatch(&self, builder: RequestBuilder) -> ApiResult<Vec<u8>> {
        let epoch = self.hook.epoch();
        let token = self.storage.try_get::<String>(keys::ACCESS_TOKEN)?;
        let request = authorize(builder, token.as_deref()).build()?;
        let method = request.method().clone();
        let url = request.url().to_string();
        debug!(%method, %url, "api request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        let message = error::extract_message(&body);

        if status == StatusCode::UNAUTHORIZED {
            warn!(%method, %url, "session rejected by server");
            self.force_teardown(epoch, token.as_deref());
            return Err(ApiError::Unauthorized { message });
        }

        debug!(%method, %url, status = status.as_u16(), "api request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Inbound interceptor for a 401 on a request that carried `rejected`.
    fn force_teardown(&self, epoch: u64, rejected: Option<&str>) {
        let clear = || {
            let current = self.storage.get::<String>(keys::ACCESS_TOKEN);
            if current.as_deref() != rejected {
                debug!("rejected token is no longer current, keeping storage");
                return false;
            }
            self.storage.clear_all();
            true
        };
        self.hook.on_unauthorized(epoch, &clear);
    }
}

/// Outbound interceptor.
fn authorize(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Empty bodies decode as JSON `null`, so `()` and `Value` accept them.
/// A body that is not JSON is offered as a plain string, which `Value` and
/// `String` accept.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(body).or_else(|e| {
        let text = String::from_utf8_lossy(body).trim().to_string();
        serde_json::from_value(Value::String(text)).map_err(|_| ApiError::Decode(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::storage::{MemoryBackend, StorageBackend};

    struct UnreadableBackend;

    impl StorageBackend for UnreadableBackend {
        fn read(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::other("locked"))
        }
        fn write(&self, _key: &str, _value: &str) -> io::Result<()> {
            Ok(())
        }
        fn delete(&self, _key: &str) -> io::Result<()> {
            Ok(())
        }
        fn clear(&self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingHook(AtomicU32);

    impl UnauthorizedHook for CountingHook {
        fn on_unauthorized(&self, _epoch: u64, clear: &dyn Fn() -> bool) {
            self.0.fetch_add(1, Ordering::SeqCst);
            clear();
        }
    }

    fn config(api_url: &str) -> ClientConfig {
        ClientConfig {
            api_url: api_url.into(),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn joins_paths_onto_base_url() {
        let storage = SecureStorage::new(Arc::new(MemoryBackend::new()), "s").unwrap();
        let client = ApiClient::new(&config("http://host/api/v1/"), storage.clone(), Arc::new(NoopHook)).unwrap();
        assert_eq!(client.url("/auth/me"), "http://host/api/v1/auth/me");
        assert_eq!(client.url("hero"), "http://host/api/v1/hero");

        let bare = ApiClient::new(&config("http://host"), storage, Arc::new(NoopHook)).unwrap();
        assert_eq!(bare.url("/auth/login"), "http://host/auth/login");
    }

    #[test]
    fn rejects_malformed_base_url() {
        let storage = SecureStorage::new(Arc::new(MemoryBackend::new()), "s").unwrap();
        let err = ApiClient::new(&config("not a url"), storage, Arc::new(NoopHook)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn storage_read_error_aborts_request_before_sending() {
        let storage = SecureStorage::new(Arc::new(UnreadableBackend), "s").unwrap();
        let hook = Arc::new(CountingHook::default());
        // Port 9 (discard) is never contacted: the interceptor fails first.
        let client = ApiClient::new(&config("http://127.0.0.1:9"), storage, hook.clone()).unwrap();

        let err = client.get::<serde_json::Value>("/auth/me").await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)), "got {err:?}");
        assert_eq!(hook.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let value: serde_json::Value = decode_body(b"").unwrap();
        assert!(value.is_null());
        decode_body::<()>(b"  \n").unwrap();
        assert!(matches!(
            decode_body::<Vec<String>>(b"{oops"),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn plain_text_success_body_is_kept_as_string() {
        let value: serde_json::Value = decode_body(b"OK\n").unwrap();
        assert_eq!(value, serde_json::Value::String("OK".into()));
        assert!(matches!(decode_body::<()>(b"OK"), Err(ApiError::Decode(_))));
        assert!(matches!(
            decode_body::<Vec<String>>(b"Deleted"),
            Err(ApiError::Decode(_))
        ));
    }
}
