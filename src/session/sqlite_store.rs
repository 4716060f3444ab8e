use std::str::FromStr;

use async_trait::async_trait;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use super::CredentialStore;
use crate::errors::ApiResult;

/// Credential storage in a local SQLite file, the counterpart of browser local storage.
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    /// Opens (creating if needed) the database at `db_url` and runs migrations.
    pub async fn connect(db_url: &str) -> ApiResult<Self> {
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            tracing::info!(db_url, "creating session database");
            Sqlite::create_database(db_url).await?;
        }
        let options = SqliteConnectOptions::from_str(db_url)?;
        // An in-memory database lives only as long as its single connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> ApiResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("session database migrations completed");
        Ok(Self { pool })
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get_item(&self, key: &str) -> ApiResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> ApiResult<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
