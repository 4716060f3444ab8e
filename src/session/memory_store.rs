use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CredentialStore;
use crate::errors::ApiResult;

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get_item(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> ApiResult<()> {
        self.items
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> ApiResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}
