use reqwest::StatusCode;

use crate::data_formats::ErrorWrapper;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not authenticated: {0}")]
    Unauthenticated(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("session storage error: {0}")]
    Session(#[from] sqlx::Error),
    #[error("session migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("upload returned no files")]
    EmptyUpload,
}

impl ApiError {
    /// Builds the error for a non-success response, preferring the server's own message.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_owned()
        });
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthenticated(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            status => ApiError::Status { status, message },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthenticated(_) => Some(StatusCode::UNAUTHORIZED),
            ApiError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// The message the server attached to the failure, if this error came from a response.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthenticated(message)
            | ApiError::NotFound(message)
            | ApiError::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .map(|wrapper| wrapper.error.message)
        .filter(|message| !message.is_empty())
}
