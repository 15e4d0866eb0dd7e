//! Data Transfer Objects - request types for the form endpoints.

use serde::{Deserialize, Serialize};

/// Contact form payload as posted by the site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub project_types: Vec<String>,
    pub message: String,
    /// Honeypot field; humans never fill it in.
    #[serde(default)]
    pub website: String,
}

/// Newsletter subscription payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}
