use tokio::sync::watch;

use super::{ActionOutcome, Reducer};
use crate::api;
use crate::errors::ApiError;
use crate::http_client::ApiClient;
use crate::models::UserProfile;
use crate::navigation::Route;
use crate::validation::{LoginForm, RegisterForm, ValidationErrors};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub pending: usize,
    /// Message shown above the login or registration form.
    pub error: Option<String>,
}

impl AuthState {
    pub fn loading(&self) -> bool {
        self.pending > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Started,
    Finished,
    SignedIn(UserProfile),
    Registered,
    SignedOut,
    Failed(String),
}

pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Intent = AuthAction;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            AuthAction::Started => AuthState {
                pending: state.pending + 1,
                error: None,
                ..state
            },
            AuthAction::Finished => AuthState {
                pending: state.pending.saturating_sub(1),
                ..state
            },
            AuthAction::SignedIn(user) => AuthState {
                user: Some(user),
                error: None,
                ..state
            },
            AuthAction::Registered => AuthState {
                error: None,
                ..state
            },
            AuthAction::SignedOut => AuthState {
                user: None,
                error: None,
                ..state
            },
            AuthAction::Failed(message) => AuthState {
                error: Some(message),
                ..state
            },
        }
    }
}

/// Login, registration and logout, with navigation on success.
pub struct AuthStore {
    client: ApiClient,
    state: watch::Sender<AuthState>,
}

/// The server's own explanation when it gave one, otherwise `fallback`.
fn failure_message(error: &ApiError, fallback: &str) -> String {
    match error {
        ApiError::Transport(_) | ApiError::Decode(_) => fallback.to_owned(),
        other => other
            .server_message()
            .map(str::to_owned)
            .unwrap_or_else(|| fallback.to_owned()),
    }
}

impl AuthStore {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { client, state }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: AuthAction) {
        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = AuthReducer::reduce(current, action);
        });
    }

    /// Loads the profile persisted by an earlier login. Nothing is restored
    /// while the stored token is missing or expired.
    pub async fn restore(&self) -> Option<UserProfile> {
        let authenticated = self.is_authenticated().await;
        let user = match api::current_user(&self.client).await {
            Ok(user) if authenticated => user,
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(%error, "could not restore session");
                None
            }
        };
        if let Some(user) = &user {
            self.dispatch(AuthAction::SignedIn(user.clone()));
        }
        user
    }

    /// On success the session is persisted and the application moves to the home view.
    pub async fn login(&self, form: &LoginForm) -> Result<ActionOutcome, ValidationErrors> {
        let request = form.validate()?;
        self.dispatch(AuthAction::Started);
        let outcome = match api::login(&self.client, &request).await {
            Ok(user) => {
                self.dispatch(AuthAction::SignedIn(user));
                self.client.navigator().navigate(Route::Home);
                ActionOutcome::Succeeded
            }
            Err(error) => {
                tracing::warn!(%error, "login failed");
                self.dispatch(AuthAction::Failed(failure_message(&error, LOGIN_FAILED)));
                ActionOutcome::Failed
            }
        };
        self.dispatch(AuthAction::Finished);
        Ok(outcome)
    }

    /// On success the application moves to the login view.
    pub async fn register(&self, form: &RegisterForm) -> Result<ActionOutcome, ValidationErrors> {
        let request = form.validate()?;
        self.dispatch(AuthAction::Started);
        let outcome = match api::register(&self.client, &request).await {
            Ok(_) => {
                self.dispatch(AuthAction::Registered);
                self.client.navigator().navigate(Route::Login);
                ActionOutcome::Succeeded
            }
            Err(error) => {
                tracing::warn!(%error, "registration failed");
                self.dispatch(AuthAction::Failed(failure_message(
                    &error,
                    REGISTRATION_FAILED,
                )));
                ActionOutcome::Failed
            }
        };
        self.dispatch(AuthAction::Finished);
        Ok(outcome)
    }

    pub async fn logout(&self) -> ActionOutcome {
        let outcome = match api::logout(&self.client).await {
            Ok(()) => ActionOutcome::Succeeded,
            Err(error) => {
                tracing::error!(%error, "could not clear stored session");
                ActionOutcome::Failed
            }
        };
        self.dispatch(AuthAction::SignedOut);
        self.client.navigator().navigate(Route::Login);
        outcome
    }

    pub async fn is_authenticated(&self) -> bool {
        api::is_authenticated(&self.client).await.unwrap_or(false)
    }
}
