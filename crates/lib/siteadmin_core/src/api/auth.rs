//! `/auth/*` endpoints.

use serde_json::{Value, json};

use super::{MultipartForm, encode_segment};
use crate::http::{ApiClient, ApiResult};
use crate::models::auth::LoginRequest;
use crate::models::{LoginResponse, ProfileUpdate, RegisterRequest, Role, User};

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.client
            .post_json("/auth/login", &LoginRequest { email, password })
            .await
    }

    pub async fn logout(&self) -> ApiResult<Value> {
        self.client.get("/auth/logout").await
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.client.get("/auth/me").await
    }

    /// Multipart `PUT /auth/me`; the avatar is sent only when present.
    pub async fn update_me(&self, update: ProfileUpdate) -> ApiResult<User> {
        let form = MultipartForm::new()
            .text("full_name", update.full_name)
            .text("email", update.email)
            .text("phone", update.phone)
            .file_opt("profile_image", update.profile_image)
            .into_form()?;
        self.client.put_multipart("/auth/me", form).await
    }

    pub async fn users(&self) -> ApiResult<Vec<User>> {
        self.client.get("/auth/users").await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Value> {
        self.client.post_json("/auth/register", request).await
    }

    pub async fn change_user_role(&self, id: &str, role: Role) -> ApiResult<Value> {
        self.client
            .put_json("/auth/change_user_role", &json!({ "id": id, "role": role }))
            .await
    }

    pub async fn delete_user(&self, id: &str) -> ApiResult<Value> {
        self.client
            .delete(&format!("/auth/users/{}", encode_segment(id)))
            .await
    }

    /// Mail a one-time code for the password reset flow.
    pub async fn send_otp(&self, email: &str) -> ApiResult<Value> {
        self.client
            .post_json(
                "/auth/send_otp_to_email_for_change_password",
                &json!({ "email": email }),
            )
            .await
    }

    pub async fn change_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> ApiResult<Value> {
        self.client
            .post_json(
                "/auth/change_password",
                &json!({ "email": email, "otp": otp, "new_password": new_password }),
            )
            .await
    }
}
