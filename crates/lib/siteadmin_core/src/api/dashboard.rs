//! Dashboard overview counters.

use crate::http::{ApiClient, ApiResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub projects: usize,
    pub applications: usize,
    pub unread_applications: usize,
}

/// Fetch projects and applications concurrently and count them.
pub async fn summary(client: &ApiClient) -> ApiResult<DashboardStats> {
    let projects = client.projects();
    let applications = client.applications();
    let (projects, applications) = futures::try_join!(projects.list(), applications.list())?;

    Ok(DashboardStats {
        projects: projects.len(),
        applications: applications.len(),
        unread_applications: applications.iter().filter(|a| !a.is_viewed).count(),
    })
}
