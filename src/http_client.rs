use std::sync::Arc;

use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::errors::{ApiError, ApiResult};
use crate::navigation::{Navigator, Route};
use crate::session::{self, CredentialStore};

/// The single outbound gateway to the content API.
///
/// Attaches the stored bearer token to every request. A 401 response clears
/// the stored token and sends the application to the login view before the
/// error is returned. Every other response is handed back as is.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        let base_url = config.api_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
            credentials,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    pub async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let builder = match session::load_token(self.credentials()).await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_owned();
        tracing::debug!(%method, %path, "sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_response(status, &body);
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, %path, "request rejected as unauthenticated");
            if let Err(clear_error) = session::clear_token(self.credentials()).await {
                tracing::error!(%clear_error, "could not clear stored token");
            }
            self.navigator.navigate(Route::Login);
        } else {
            tracing::debug!(%method, %path, %status, "request failed");
        }
        Err(error)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<T> {
        let response = self.send(self.request(Method::GET, path).query(query)).await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        decode(response).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ApiResult<T> {
        let response = self
            .send(self.request(Method::POST, path).multipart(form))
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
