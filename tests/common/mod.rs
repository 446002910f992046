#![allow(dead_code)]

use async_trait::async_trait;
use balance_relay::application::pipeline::TransactionPipeline;
use balance_relay::config::PipelineConfig;
use balance_relay::domain::account::{AccountResource, AccountType};
use balance_relay::domain::envelope::PushEnvelope;
use balance_relay::domain::event::{EventType, WebhookEventCallback};
use balance_relay::domain::money::MoneyObject;
use balance_relay::domain::ports::{BalanceStore, BankingApi, WebhookSender};
use balance_relay::domain::subscriber::SubscriberClass;
use balance_relay::domain::transaction::TransactionResource;
use balance_relay::error::{RelayError, Result};
use balance_relay::infrastructure::in_memory::InMemoryBalanceStore;
use balance_relay::infrastructure::local_bus::LocalBus;
use bytes::Bytes;
use chrono::DateTime;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

pub const ACCOUNT_ID: &str = "acc-1";
pub const TRANSACTION_ID: &str = "tx-1";
pub const BALANCE: &str = "1234.56";

pub fn account(account_type: AccountType) -> AccountResource {
    AccountResource::new(ACCOUNT_ID, account_type, MoneyObject::new("AUD", BALANCE))
}

pub fn transaction(value: &str) -> TransactionResource {
    TransactionResource::new(
        TRANSACTION_ID,
        ACCOUNT_ID,
        "Coffee Shop",
        MoneyObject::new("AUD", value),
        DateTime::parse_from_rfc3339("2023-05-02T08:15:00+10:00").unwrap(),
    )
}

/// Builds a `/process` body for an event referencing `transaction_id`.
pub fn push_body(event_type: &str, transaction_id: Option<&str>) -> Vec<u8> {
    let event = WebhookEventCallback::new(EventType::from(event_type), transaction_id);
    let data = serde_json::to_vec(&event).unwrap();
    serde_json::to_vec(&PushEnvelope::wrap("msg-1", &data)).unwrap()
}

/// Banking API backed by fixed records.
#[derive(Default)]
pub struct StaticBankingApi {
    transactions: HashMap<String, TransactionResource>,
    accounts: HashMap<String, AccountResource>,
    pub calls: AtomicUsize,
}

impl StaticBankingApi {
    pub fn new(account: AccountResource, transaction: TransactionResource) -> Self {
        let mut api = Self::default();
        api.accounts.insert(account.id.clone(), account);
        api.transactions.insert(transaction.id.clone(), transaction);
        api
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BankingApi for StaticBankingApi {
    async fn get_transaction(&self, id: &str) -> Result<TransactionResource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transactions
            .get(id)
            .cloned()
            .ok_or_else(|| RelayError::UpstreamError(format!("transaction {} not found", id)))
    }

    async fn get_account(&self, id: &str) -> Result<AccountResource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accounts
            .get(id)
            .cloned()
            .ok_or_else(|| RelayError::UpstreamError(format!("account {} not found", id)))
    }
}

/// Records every delivery. Hosts named `fail.test` get HTTP 500 and hosts named
/// `down.test` a transport error; everything else succeeds.
#[derive(Default)]
pub struct RecordingSender {
    pub deliveries: Mutex<Vec<(String, Bytes)>>,
    pub delay: Option<Duration>,
    pub completed: AtomicUsize,
}

impl RecordingSender {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn delivered_to(&self, uri: &str) -> Vec<serde_json::Value> {
        self.deliveries
            .lock()
            .await
            .iter()
            .filter(|(target, _)| target == uri)
            .map(|(_, body)| serde_json::from_slice(body).unwrap())
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.deliveries.lock().await.len()
    }
}

#[async_trait]
impl WebhookSender for RecordingSender {
    async fn post_json(&self, uri: &Url, body: Bytes) -> Result<u16> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.deliveries
            .lock()
            .await
            .push((uri.to_string(), body));
        self.completed.fetch_add(1, Ordering::SeqCst);

        match uri.host_str() {
            Some("fail.test") => Ok(500),
            Some("down.test") => Err(RelayError::DeliveryError("connection refused".into())),
            _ => Ok(200),
        }
    }
}

/// Store whose balance writes always fail.
#[derive(Default)]
pub struct ReadOnlyStore {
    pub inner: InMemoryBalanceStore,
}

#[async_trait]
impl BalanceStore for ReadOnlyStore {
    async fn get_balance(&self) -> Result<String> {
        self.inner.get_balance().await
    }

    async fn set_balance(&self, _value: &str) -> Result<()> {
        Err(RelayError::StorageError("read-only".to_string()))
    }

    async fn list_subscriber_uris(&self, class: SubscriberClass) -> Result<Vec<String>> {
        self.inner.list_subscriber_uris(class).await
    }

    async fn add_subscriber_uri(&self, class: SubscriberClass, uri: &str) -> Result<()> {
        self.inner.add_subscriber_uri(class, uri).await
    }
}

/// Everything a pipeline test needs to inspect.
pub struct Harness {
    pub banking: Arc<StaticBankingApi>,
    pub store: Arc<InMemoryBalanceStore>,
    pub bus: Arc<LocalBus>,
    pub sender: Arc<RecordingSender>,
    pub pipeline: Arc<TransactionPipeline>,
}

impl Harness {
    pub fn new(account: AccountResource, transaction: TransactionResource) -> Self {
        Self::with_sender(account, transaction, RecordingSender::default())
    }

    pub fn with_sender(
        account: AccountResource,
        transaction: TransactionResource,
        sender: RecordingSender,
    ) -> Self {
        let banking = Arc::new(StaticBankingApi::new(account, transaction));
        let store = Arc::new(InMemoryBalanceStore::new());
        let bus = Arc::new(LocalBus::new());
        let sender = Arc::new(sender);
        let pipeline = Arc::new(TransactionPipeline::new(
            banking.clone(),
            store.clone(),
            bus.clone(),
            sender.clone(),
            PipelineConfig {
                delivery_timeout: Duration::from_secs(2),
                ..PipelineConfig::default()
            },
        ));

        Self {
            banking,
            store,
            bus,
            sender,
            pipeline,
        }
    }

    pub async fn subscribe(&self, class: SubscriberClass, uri: &str) {
        self.store.add_subscriber_uri(class, uri).await.unwrap();
    }
}
