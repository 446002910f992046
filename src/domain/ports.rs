use super::account::AccountResource;
use super::subscriber::SubscriberClass;
use super::transaction::TransactionResource;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use url::Url;

/// Document store holding the cached balance and the subscriber lists.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn get_balance(&self) -> Result<String>;
    /// Overwrites the cached balance.
    async fn set_balance(&self, value: &str) -> Result<()>;
    async fn list_subscriber_uris(&self, class: SubscriberClass) -> Result<Vec<String>>;
    async fn add_subscriber_uri(&self, class: SubscriberClass, uri: &str) -> Result<()>;
}

/// Read access to the upstream banking API.
#[async_trait]
pub trait BankingApi: Send + Sync {
    async fn get_transaction(&self, id: &str) -> Result<TransactionResource>;
    async fn get_account(&self, id: &str) -> Result<AccountResource>;
}

/// Outbound message queue.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publishes `data` to `topic` and returns the generated message id.
    async fn publish(&self, topic: &str, data: Bytes) -> Result<String>;
}

/// HTTP transport used to deliver one payload to one subscriber.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// POSTs a JSON body and returns the response status code.
    async fn post_json(&self, uri: &Url, body: Bytes) -> Result<u16>;
}

/// Authenticity check for inbound webhook bodies.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, body: &[u8], signature: &str) -> bool;
}

pub type BalanceStoreHandle = Arc<dyn BalanceStore>;
pub type BankingApiHandle = Arc<dyn BankingApi>;
pub type MessagePublisherHandle = Arc<dyn MessagePublisher>;
pub type WebhookSenderHandle = Arc<dyn WebhookSender>;
pub type SignatureVerifierHandle = Arc<dyn SignatureVerifier>;
