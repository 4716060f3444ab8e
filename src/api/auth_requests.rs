use crate::data_formats::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse};
use crate::errors::ApiResult;
use crate::http_client::ApiClient;
use crate::models::UserProfile;
use crate::session;

pub async fn register(client: &ApiClient, request: &RegisterRequest) -> ApiResult<UserProfile> {
    let RegisterResponse { user, .. }: RegisterResponse = client
        .post_json("/auth/local/register", request)
        .await?;
    tracing::info!(username = %user.username, "registered account");
    Ok(user)
}

/// Exchanges credentials for a token and persists the resulting session.
pub async fn login(client: &ApiClient, request: &LoginRequest) -> ApiResult<UserProfile> {
    let AuthResponse { jwt, user }: AuthResponse = client.post_json("/auth/local", request).await?;
    session::persist_session(client.credentials(), &jwt, &user).await?;
    tracing::info!(username = %user.username, "logged in");
    Ok(user)
}

/// Forgets the stored token and profile. Makes no network call.
pub async fn logout(client: &ApiClient) -> ApiResult<()> {
    session::clear_session(client.credentials()).await?;
    tracing::info!("logged out");
    Ok(())
}

pub async fn current_user(client: &ApiClient) -> ApiResult<Option<UserProfile>> {
    session::load_user(client.credentials()).await
}

/// True while a token is stored that has not expired.
pub async fn is_authenticated(client: &ApiClient) -> ApiResult<bool> {
    let token = session::load_token(client.credentials()).await?;
    Ok(token.map_or(false, |token| !session::is_expired(&token)))
}
