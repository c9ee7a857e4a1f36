//! Per-resource helpers over [`ApiClient`].
//!
//! These are thin parameter-to-request mappings; all session handling lives
//! in the client's interceptors.

mod auth;
mod content;
pub mod dashboard;

use std::marker::PhantomData;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use auth::AuthApi;
pub use content::{ApplicationsApi, MapUrlApi, ProjectsApi};

use crate::http::{ApiClient, ApiError, ApiResult};
use crate::models::{
    About, ContactInfo, Hero, Language, Partner, Service, Social, Stat, Testimonial, Workflow,
};

/// File bytes for a multipart upload.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// MIME type; guessed by the server when absent.
    pub mime: Option<String>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Read a file from disk, naming the part after the file.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        Ok(Self::new(file_name, bytes))
    }
}

/// Builder for `multipart/form-data` bodies.
#[derive(Debug, Default)]
pub struct MultipartForm {
    texts: Vec<(String, String)>,
    files: Vec<(String, Upload)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.texts.push((name.into(), value.into()));
        self
    }

    /// Add a text field only when `value` is present.
    pub fn text_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    pub fn file(mut self, name: impl Into<String>, upload: Upload) -> Self {
        self.files.push((name.into(), upload));
        self
    }

    pub fn file_opt(self, name: impl Into<String>, upload: Option<Upload>) -> Self {
        match upload {
            Some(u) => self.file(name, u),
            None => self,
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.texts
            .iter()
            .map(|(n, _)| n.as_str())
            .chain(self.files.iter().map(|(n, _)| n.as_str()))
    }

    pub fn into_form(self) -> ApiResult<Form> {
        let mut form = Form::new();
        for (name, value) in self.texts {
            form = form.text(name, value);
        }
        for (name, upload) in self.files {
            let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
            if let Some(mime) = upload.mime {
                part = part
                    .mime_str(&mime)
                    .map_err(|e| ApiError::Multipart(format!("invalid MIME type {mime:?}: {e}")))?;
            }
            form = form.part(name, part);
        }
        Ok(form)
    }
}

/// A REST collection at `/{path}` with `/{path}/{id}` items.
pub struct Resource<'a, T> {
    client: &'a ApiClient,
    path: &'static str,
    _record: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> Resource<'a, T> {
    pub fn new(client: &'a ApiClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub async fn list(&self) -> ApiResult<Vec<T>> {
        let value: Value = self.client.get(self.path).await?;
        // Some collections answer `null` when empty.
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Singleton resources (`/about`, `/map_url`) answer the collection path
    /// with one record.
    pub async fn fetch(&self) -> ApiResult<T> {
        self.client.get(self.path).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<T> {
        self.client.get(&self.item_path(id)).await
    }

    pub async fn create_json<B: Serialize + ?Sized>(&self, body: &B) -> ApiResult<Value> {
        self.client.post_json(self.path, body).await
    }

    /// Updates carry the record id in the body, not the path.
    pub async fn update_json<B: Serialize + ?Sized>(&self, body: &B) -> ApiResult<Value> {
        self.client.put_json(self.path, body).await
    }

    pub async fn create_form(&self, form: MultipartForm) -> ApiResult<Value> {
        self.client.post_multipart(self.path, form.into_form()?).await
    }

    pub async fn update_form(&self, form: MultipartForm) -> ApiResult<Value> {
        self.client.put_multipart(self.path, form.into_form()?).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<Value> {
        self.client.delete(&self.item_path(id)).await
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, encode_segment(id))
    }
}

/// Percent-encode a single path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn hero(&self) -> Resource<'_, Hero> {
        Resource::new(self, "/hero")
    }

    pub fn about(&self) -> Resource<'_, About> {
        Resource::new(self, "/about")
    }

    pub fn services(&self) -> Resource<'_, Service> {
        Resource::new(self, "/services")
    }

    pub fn stats(&self) -> Resource<'_, Stat> {
        Resource::new(self, "/stats")
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    pub fn workflow(&self) -> Resource<'_, Workflow> {
        Resource::new(self, "/workflow")
    }

    pub fn partners(&self) -> Resource<'_, Partner> {
        Resource::new(self, "/partners")
    }

    pub fn testimonials(&self) -> Resource<'_, Testimonial> {
        Resource::new(self, "/testimonials")
    }

    pub fn contact_info(&self) -> Resource<'_, ContactInfo> {
        Resource::new(self, "/contact_info")
    }

    pub fn socials(&self) -> Resource<'_, Social> {
        Resource::new(self, "/socials")
    }

    pub fn map_url(&self) -> MapUrlApi<'_> {
        MapUrlApi::new(self)
    }

    pub fn applications(&self) -> ApplicationsApi<'_> {
        ApplicationsApi::new(self)
    }

    pub fn languages(&self) -> Resource<'_, Language> {
        Resource::new(self, "/languages")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_collects_fields_in_order() {
        let form = MultipartForm::new()
            .text("title", "Tower")
            .text_opt("id", None::<String>)
            .text_opt("badge", Some("new"))
            .file("cover_image", Upload::new("c.jpg", vec![1, 2, 3]).with_mime("image/jpeg"))
            .file_opt("extra", None);
        let names: Vec<_> = form.field_names().collect();
        assert_eq!(names, ["title", "badge", "cover_image"]);
        assert!(form.into_form().is_ok());
    }

    #[test]
    fn bad_mime_type_is_reported() {
        let form = MultipartForm::new().file("icon", Upload::new("i.png", vec![]).with_mime("not a mime"));
        assert!(matches!(form.into_form(), Err(ApiError::Multipart(_))));
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(encode_segment("abc-123"), "abc-123");
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
    }
}
