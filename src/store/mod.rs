//! Client state: one store per concern, each a `watch` channel holding the
//! current snapshot and a pure reducer that computes the next one.

mod article_state;
mod article_store;
mod auth_store;
mod category_store;

pub use article_state::*;
pub use article_store::*;
pub use auth_store::*;
pub use category_store::*;

use crate::http_client::ApiClient;

/// Pure state transition.
pub trait Reducer {
    type State;
    type Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}

/// What became of one store action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    /// The request failed; the store's error flag and message are set.
    Failed,
    /// A newer request of the same kind started first; this response was dropped.
    Superseded,
    /// No usable session; the application was sent to the login view and nothing was requested.
    Unauthenticated,
    /// Nothing to do, e.g. asking for another page while one is loading.
    Skipped,
}

/// A modal message that stays up until dismissed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub visible: bool,
    pub message: String,
}

impl Notification {
    pub fn shown(message: impl Into<String>) -> Self {
        Self {
            visible: true,
            message: message.into(),
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Runs the session guard for a protected action.
pub(crate) async fn authorize(client: &ApiClient) -> bool {
    match crate::session::require_session(client.credentials(), client.navigator()).await {
        Ok(session) => session.is_some(),
        Err(error) => {
            tracing::error!(%error, "could not read the stored session");
            false
        }
    }
}
