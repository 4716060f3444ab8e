pub mod api;
pub mod config;
mod data_formats;
mod errors;
pub mod http_client;
pub mod models;
pub mod navigation;
pub mod session;
pub mod store;
pub mod validation;

use std::sync::Arc;

pub use config::ClientConfig;
pub use data_formats::*;
pub use errors::{ApiError, ApiResult};
pub use http_client::ApiClient;
use navigation::Navigator;
use session::{CredentialStore, SqliteCredentialStore};
use store::{ArticleStore, AuthStore, CategoryStore};
use tracing_subscriber::EnvFilter;

/// Everything a view needs: the API client and the stores built on it.
pub struct AppContext {
    pub config: ClientConfig,
    pub client: ApiClient,
    pub articles: ArticleStore,
    pub categories: CategoryStore,
    pub auth: AuthStore,
}

impl AppContext {
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        let client = ApiClient::new(&config, credentials, navigator)?;
        Ok(Self {
            articles: ArticleStore::new(client.clone(), config.page_size),
            categories: CategoryStore::new(client.clone()),
            auth: AuthStore::new(client.clone()),
            client,
            config,
        })
    }

    /// Builds a context whose session is persisted in the configured SQLite database.
    pub async fn connect(config: ClientConfig, navigator: Arc<dyn Navigator>) -> ApiResult<Self> {
        let credentials = SqliteCredentialStore::connect(&config.session_database_url).await?;
        Self::new(config, Arc::new(credentials), navigator)
    }
}

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
