//! Website content records managed from the panel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub background_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct About {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub experience_years: u32,
    pub projects_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub id: String,
    pub title: String,
    pub value: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectImage {
    pub id: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub details: String,
    pub badge: String,
    pub address: String,
    pub map_url: String,
    pub cover_image: String,
    #[serde(default)]
    pub image_gallery: Vec<ProjectImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub title: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub title: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub customer_full_name: String,
    pub customer_type: String,
    pub customer_review: String,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: String,
    pub title: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub contact_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Social {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Map pin for the contact page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapUrl {
    pub long: String,
    pub lat: String,
}

/// A contact-form submission from a site visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    #[serde(default)]
    pub is_viewed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    pub lang: String,
}
