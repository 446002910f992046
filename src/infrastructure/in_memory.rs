use crate::domain::ports::BalanceStore;
use crate::domain::subscriber::SubscriberClass;
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory balance store.
///
/// Uses `Arc<RwLock<..>>` so clones share state. Suited to tests and to running
/// without a persistent database.
#[derive(Default, Clone)]
pub struct InMemoryBalanceStore {
    balance: Arc<RwLock<Option<String>>>,
    subscribers: Arc<RwLock<HashMap<SubscriberClass, Vec<String>>>>,
}

impl InMemoryBalanceStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn get_balance(&self) -> Result<String> {
        let balance = self.balance.read().await;
        balance
            .clone()
            .ok_or_else(|| RelayError::StorageError("balance has not been recorded".to_string()))
    }

    async fn set_balance(&self, value: &str) -> Result<()> {
        let mut balance = self.balance.write().await;
        *balance = Some(value.to_string());
        Ok(())
    }

    async fn list_subscriber_uris(&self, class: SubscriberClass) -> Result<Vec<String>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.get(&class).cloned().unwrap_or_default())
    }

    async fn add_subscriber_uri(&self, class: SubscriberClass, uri: &str) -> Result<()> {
        let mut subscribers = self.subscribers.write().await;
        subscribers.entry(class).or_default().push(uri.to_string());
        Ok(())
    }
}
