use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::data_formats::UploadedFile;
use crate::errors::{ApiError, ApiResult};
use crate::http_client::ApiClient;

/// Uploads one image and returns the URL the server hosts it at.
pub async fn upload_image(client: &ApiClient, bytes: Vec<u8>, file_name: &str) -> ApiResult<String> {
    let part = Part::bytes(bytes)
        .file_name(file_name.to_owned())
        .mime_str(guess_mime(file_name))?;
    let files: Vec<UploadedFile> = client
        .post_multipart("/upload", Form::new().part("files", part))
        .await?;
    let file = files.into_iter().next().ok_or(ApiError::EmptyUpload)?;
    tracing::info!(url = %file.url, "uploaded image");
    Ok(file.url)
}

fn guess_mime(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
