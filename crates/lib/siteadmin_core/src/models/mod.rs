//! Wire and domain records exchanged with the site API.

pub mod auth;
pub mod content;

pub use auth::{LoginResponse, ProfileUpdate, RegisterRequest, Role, User};
pub use content::*;
