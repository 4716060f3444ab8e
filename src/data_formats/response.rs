use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

// ----------------- Auth Response -----------------
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: UserProfile,
}

/// Registration may or may not return a token depending on email confirmation settings.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterResponse {
    #[serde(default)]
    pub jwt: Option<String>,
    pub user: UserProfile,
}

// ----------------- Upload Response -----------------
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: i64,
    #[serde(default)]
    pub document_id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
}
