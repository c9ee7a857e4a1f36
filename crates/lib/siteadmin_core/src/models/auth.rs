//! Authentication models.

use serde::{Deserialize, Serialize};

/// Administrator role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "superAdmin")]
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "superAdmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "superAdmin" | "super-admin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Authenticated administrator, as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Fields sent to `PUT /auth/me`.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub profile_image: Option<crate::api::Upload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_parses_server_record() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "1",
            "full_name": "A",
            "email": "a@b.com",
            "phone": "+994",
            "role": "superAdmin",
            "profile_image": "https://cdn/x.png"
        }))
        .unwrap();
        assert!(user.is_super_admin());
        assert_eq!(user.profile_image.as_deref(), Some("https://cdn/x.png"));
    }

    #[test]
    fn user_tolerates_missing_optional_fields() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "1",
            "full_name": "A",
            "email": "a@b.com",
            "role": "admin"
        }))
        .unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.phone.is_empty());
        assert!(user.profile_image.is_none());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_value::<User>(serde_json::json!({
            "id": "1", "full_name": "A", "email": "a@b.com", "role": "root"
        }));
        assert!(parsed.is_err());
        assert!("root".parse::<Role>().is_err());
        assert_eq!("superAdmin".parse::<Role>().unwrap(), Role::SuperAdmin);
    }
}
