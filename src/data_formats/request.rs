use serde::{Deserialize, Serialize};

// ----------------- Auth Request -----------------
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

// ----------------- Article Request -----------------
/// Body of create and update calls, sent as `{ "data": ArticlePayload }`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ArticlePayload {
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    pub category: i64,
}
