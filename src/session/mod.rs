//! Session credential persistence.
//!
//! The session is two items in a key/value store: the bearer token under
//! `token` and the serialized user profile under `user`. A missing token means
//! the client is unauthenticated.

use async_trait::async_trait;

use crate::errors::ApiResult;
use crate::models::UserProfile;
use crate::navigation::{Navigator, Route};

mod memory_store;
mod sqlite_store;
mod token;

pub use memory_store::MemoryCredentialStore;
pub use sqlite_store::SqliteCredentialStore;
pub use token::{inspect_token, is_expired, TokenClaims};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Key/value storage for the session, shaped after browser local storage.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_item(&self, key: &str) -> ApiResult<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> ApiResult<()>;
    async fn remove_item(&self, key: &str) -> ApiResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Option<UserProfile>,
}

pub async fn load_token(store: &dyn CredentialStore) -> ApiResult<Option<String>> {
    Ok(store
        .get_item(TOKEN_KEY)
        .await?
        .filter(|token| !token.is_empty()))
}

/// The stored profile. A profile that no longer parses is treated as absent.
pub async fn load_user(store: &dyn CredentialStore) -> ApiResult<Option<UserProfile>> {
    let raw = match store.get_item(USER_KEY).await? {
        Some(raw) => raw,
        None => return Ok(None),
    };
    match serde_json::from_str(&raw) {
        Ok(user) => Ok(Some(user)),
        Err(error) => {
            tracing::warn!(%error, "discarding unreadable stored profile");
            Ok(None)
        }
    }
}

pub async fn load_session(store: &dyn CredentialStore) -> ApiResult<Option<Session>> {
    let token = match load_token(store).await? {
        Some(token) => token,
        None => return Ok(None),
    };
    let user = load_user(store).await?;
    Ok(Some(Session { token, user }))
}

pub async fn persist_session(
    store: &dyn CredentialStore,
    token: &str,
    user: &UserProfile,
) -> ApiResult<()> {
    let user = serde_json::to_string(user)?;
    store.set_item(TOKEN_KEY, token).await?;
    store.set_item(USER_KEY, &user).await?;
    Ok(())
}

pub async fn clear_token(store: &dyn CredentialStore) -> ApiResult<()> {
    store.remove_item(TOKEN_KEY).await
}

pub async fn clear_session(store: &dyn CredentialStore) -> ApiResult<()> {
    store.remove_item(TOKEN_KEY).await?;
    store.remove_item(USER_KEY).await
}

/// Returns the active session, or sends the application to the login view.
///
/// An expired JWT is removed from storage and handled as if it were absent.
pub async fn require_session(
    store: &dyn CredentialStore,
    navigator: &dyn Navigator,
) -> ApiResult<Option<Session>> {
    match load_session(store).await? {
        Some(session) if is_expired(&session.token) => {
            tracing::info!("stored token has expired");
            clear_token(store).await?;
            navigator.navigate(Route::Login);
            Ok(None)
        }
        Some(session) => Ok(Some(session)),
        None => {
            tracing::debug!("no stored token, redirecting to login");
            navigator.navigate(Route::Login);
            Ok(None)
        }
    }
}
