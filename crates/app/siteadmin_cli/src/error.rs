use siteadmin_core::validation::ValidationErrors;
use siteadmin_core::{ApiError, SessionError, StorageError};
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("access denied: {0} requires a super admin")]
    AccessDenied(String),

    #[error("session expired, log in again")]
    SessionExpired,

    #[error("{}", .0)]
    Validation(#[from] ValidationErrors),

    #[error("{}", .0)]
    Api(#[from] ApiError),

    #[error("{}", .0)]
    Session(#[from] SessionError),

    #[error("Storage::{:?}: {}", .0, .0)]
    Storage(#[from] StorageError),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("Json::{:?}: {}", .0, .0)]
    Json(#[from] serde_json::Error),

    #[error("Logging: {}", .0)]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

impl Error {
    /// Whether the server rejected the session during this command.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Error::Api(e) => e.is_unauthorized(),
            Error::Session(SessionError::Api(e)) => e.is_unauthorized(),
            _ => false,
        }
    }
}
