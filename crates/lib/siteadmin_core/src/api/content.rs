//! Content endpoints that do not fit the plain collection shape.

use std::ops::Deref;

use serde_json::{Value, json};

use super::{MultipartForm, Resource, encode_segment};
use crate::http::{ApiClient, ApiResult};
use crate::models::{Application, MapUrl, Project};

/// `/projects` plus its image gallery endpoints.
pub struct ProjectsApi<'a> {
    resource: Resource<'a, Project>,
    client: &'a ApiClient,
}

impl<'a> ProjectsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            resource: Resource::new(client, "/projects"),
            client,
        }
    }

    pub async fn add_images(&self, project_id: &str, form: MultipartForm) -> ApiResult<Value> {
        self.client
            .post_multipart(&images_path(project_id), form.into_form()?)
            .await
    }

    pub async fn update_image(&self, project_id: &str, form: MultipartForm) -> ApiResult<Value> {
        self.client
            .put_multipart(&images_path(project_id), form.into_form()?)
            .await
    }

    pub async fn delete_image(&self, project_id: &str, image_id: &str) -> ApiResult<Value> {
        let path = format!(
            "/projects/{}/{}",
            encode_segment(project_id),
            encode_segment(image_id)
        );
        self.client.delete(&path).await
    }
}

impl<'a> Deref for ProjectsApi<'a> {
    type Target = Resource<'a, Project>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

fn images_path(project_id: &str) -> String {
    format!("/projects/images/{}", encode_segment(project_id))
}

/// `/applications`: visitor submissions with a read flag.
pub struct ApplicationsApi<'a> {
    resource: Resource<'a, Application>,
    client: &'a ApiClient,
}

impl<'a> ApplicationsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            resource: Resource::new(client, "/applications"),
            client,
        }
    }

    pub async fn mark_viewed(&self, id: &str, is_viewed: bool) -> ApiResult<Value> {
        self.client
            .put_json("/applications", &json!({ "id": id, "is_viewed": is_viewed }))
            .await
    }
}

impl<'a> Deref for ApplicationsApi<'a> {
    type Target = Resource<'a, Application>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

/// `/map_url` singleton.
pub struct MapUrlApi<'a> {
    resource: Resource<'a, MapUrl>,
}

impl<'a> MapUrlApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            resource: Resource::new(client, "/map_url"),
        }
    }

    pub async fn get(&self) -> ApiResult<MapUrl> {
        self.resource.fetch().await
    }

    pub async fn update(&self, map_url: &MapUrl) -> ApiResult<Value> {
        self.resource.update_json(map_url).await
    }
}
