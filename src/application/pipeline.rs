use super::dispatcher::{DeliveryDispatcher, DeliveryReport};
use crate::config::{PersistencePolicy, PipelineConfig};
use crate::domain::account::AccountResource;
use crate::domain::envelope::decode_push_event;
use crate::domain::event::{EventType, WebhookEventCallback};
use crate::domain::payload::{build_formatted_event, build_raw_event, build_republish_envelope};
use crate::domain::ports::{
    BalanceStoreHandle, BankingApiHandle, MessagePublisherHandle, WebhookSenderHandle,
};
use crate::domain::subscriber::{SubscriberClass, is_eligible_for_formatted};
use crate::domain::transaction::TransactionResource;
use crate::error::{RelayError, Result};
use bytes::Bytes;
use tokio::task::JoinSet;

/// Why a subscriber class received nothing during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoSubscribers,
    Ineligible,
    NotADebit,
    SubscriberLookupFailed(String),
    EncodingFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanOutReport {
    Skipped(SkipReason),
    Dispatched(DeliveryReport),
}

impl FanOutReport {
    /// The delivery report, if the class was dispatched at all.
    pub fn deliveries(&self) -> Option<&DeliveryReport> {
        match self {
            Self::Dispatched(report) => Some(report),
            Self::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub transaction_id: String,
    pub balance_persisted: bool,
    pub formatted: FanOutReport,
    pub raw: FanOutReport,
    /// Message id of the downstream re-publish, if it succeeded.
    pub republished: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The event referenced no transaction.
    NoOp,
    Completed(RunReport),
}

enum Stage {
    Persisted(bool),
    FannedOut(SubscriberClass, FanOutReport),
}

/// End-to-end processing of one inbound transaction notification.
///
/// A run decodes the event, enriches it through the banking API, then
/// concurrently persists the balance and fans out to both subscriber classes
/// before re-publishing the canonical record. Only decode and enrichment
/// failures (and persistence failures under [`PersistencePolicy::Abort`]) are
/// returned to the caller; everything after enrichment is logged and reported.
pub struct TransactionPipeline {
    banking: BankingApiHandle,
    store: BalanceStoreHandle,
    publisher: MessagePublisherHandle,
    dispatcher: DeliveryDispatcher,
    config: PipelineConfig,
}

impl TransactionPipeline {
    pub fn new(
        banking: BankingApiHandle,
        store: BalanceStoreHandle,
        publisher: MessagePublisherHandle,
        sender: WebhookSenderHandle,
        config: PipelineConfig,
    ) -> Self {
        let dispatcher = DeliveryDispatcher::new(sender, config.delivery_timeout);
        Self {
            banking,
            store,
            publisher,
            dispatcher,
            config,
        }
    }

    /// Processes a raw `/process` body.
    pub async fn process(&self, body: &[u8]) -> Result<RunOutcome> {
        let event = decode_push_event(body)?;
        self.process_event(&event).await
    }

    /// Processes an already decoded webhook event.
    pub async fn process_event(&self, event: &WebhookEventCallback) -> Result<RunOutcome> {
        let Some(transaction_id) = event.transaction_id() else {
            tracing::info!(event_type = ?event.event_type(), "no transaction details");
            return Ok(RunOutcome::NoOp);
        };

        let transaction = self
            .banking
            .get_transaction(transaction_id)
            .await
            .map_err(|e| upstream("transaction", transaction_id, e))?;

        let account_id = transaction.account_id().to_string();
        let account = self
            .banking
            .get_account(&account_id)
            .await
            .map_err(|e| upstream("account", &account_id, e))?;

        let report = self
            .run(event.event_type().clone(), account, transaction)
            .await?;
        Ok(RunOutcome::Completed(report))
    }

    /// Persists, fans out and re-publishes an enriched transaction.
    pub async fn run(
        &self,
        event_type: EventType,
        account: AccountResource,
        transaction: TransactionResource,
    ) -> Result<RunReport> {
        let mut stages = JoinSet::new();
        let balance = account.balance_value().to_string();

        match self.config.persistence_policy {
            PersistencePolicy::Abort => {
                persist_balance(&self.store, &balance).await?;
                stages.spawn(async { Stage::Persisted(true) });
            }
            PersistencePolicy::LogAndContinue => {
                let store = self.store.clone();
                stages.spawn(async move {
                    Stage::Persisted(persist_balance(&store, &balance).await.is_ok())
                });
            }
        }

        let formatted_payload = if is_eligible_for_formatted(&event_type, account.account_type())
        {
            match build_formatted_event(&account, &transaction) {
                Some(event) => encode(&event),
                None => {
                    tracing::info!(
                        transaction_id = %transaction.id,
                        description = %transaction.attributes.description,
                        amount = %transaction.attributes.amount.value,
                        "non-debit amount, skipping formatted subscribers"
                    );
                    Err(SkipReason::NotADebit)
                }
            }
        } else {
            Err(SkipReason::Ineligible)
        };
        let raw_payload = encode(&build_raw_event(&account, &transaction));

        for (class, payload) in [
            (SubscriberClass::Formatted, formatted_payload),
            (SubscriberClass::Raw, raw_payload),
        ] {
            let store = self.store.clone();
            let dispatcher = self.dispatcher.clone();
            stages.spawn(async move {
                Stage::FannedOut(class, fan_out(&store, &dispatcher, class, payload).await)
            });
        }

        let republished = self.republish(&account, &transaction).await;

        let mut report = RunReport {
            transaction_id: transaction.id.clone(),
            balance_persisted: false,
            formatted: FanOutReport::Skipped(SkipReason::NoSubscribers),
            raw: FanOutReport::Skipped(SkipReason::NoSubscribers),
            republished,
        };
        while let Some(joined) = stages.join_next().await {
            match joined {
                Ok(Stage::Persisted(ok)) => report.balance_persisted = ok,
                Ok(Stage::FannedOut(SubscriberClass::Formatted, fan_out)) => {
                    report.formatted = fan_out
                }
                Ok(Stage::FannedOut(SubscriberClass::Raw, fan_out)) => report.raw = fan_out,
                Err(e) => tracing::error!(error = %e, "pipeline stage did not complete"),
            }
        }

        tracing::info!(
            transaction_id = %report.transaction_id,
            balance_persisted = report.balance_persisted,
            republished = report.republished.is_some(),
            "transaction processed"
        );
        Ok(report)
    }

    async fn republish(
        &self,
        account: &AccountResource,
        transaction: &TransactionResource,
    ) -> Option<String> {
        let envelope = build_republish_envelope(account, transaction);
        let data = match serde_json::to_vec(&envelope) {
            Ok(data) => Bytes::from(data),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode republish envelope");
                return None;
            }
        };

        let topic = &self.config.republish_topic;
        match self.publisher.publish(topic, data).await {
            Ok(message_id) => {
                tracing::debug!(topic = %topic, message_id = %message_id, "republished transaction");
                Some(message_id)
            }
            Err(e) => {
                tracing::error!(topic = %topic, error = %e, "failed to republish transaction");
                None
            }
        }
    }
}

fn upstream(resource: &str, id: &str, error: RelayError) -> RelayError {
    tracing::error!(resource, id, error = %error, "enrichment failed");
    match error {
        RelayError::UpstreamError(_) => error,
        other => RelayError::UpstreamError(format!("fetching {} {}: {}", resource, id, other)),
    }
}

async fn persist_balance(store: &BalanceStoreHandle, balance: &str) -> Result<()> {
    match store.set_balance(balance).await {
        Ok(()) => {
            tracing::debug!(balance, "cached balance updated");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to update cached balance");
            Err(e)
        }
    }
}

fn encode<T: serde::Serialize>(event: &T) -> std::result::Result<Bytes, SkipReason> {
    serde_json::to_vec(event)
        .map(Bytes::from)
        .map_err(|e| SkipReason::EncodingFailed(e.to_string()))
}

async fn fan_out(
    store: &BalanceStoreHandle,
    dispatcher: &DeliveryDispatcher,
    class: SubscriberClass,
    payload: std::result::Result<Bytes, SkipReason>,
) -> FanOutReport {
    let uris = match store.list_subscriber_uris(class).await {
        Ok(uris) => uris,
        Err(e) => {
            tracing::error!(%class, error = %e, "failed to read subscriber uris");
            return FanOutReport::Skipped(SkipReason::SubscriberLookupFailed(e.to_string()));
        }
    };
    tracing::info!(%class, count = uris.len(), "sending webhook events");

    if uris.is_empty() {
        return FanOutReport::Skipped(SkipReason::NoSubscribers);
    }
    match payload {
        Ok(payload) => FanOutReport::Dispatched(dispatcher.deliver_all(class, uris, payload).await),
        Err(reason) => FanOutReport::Skipped(reason),
    }
}
