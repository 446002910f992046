use crate::domain::ports::WebhookSenderHandle;
use crate::domain::subscriber::SubscriberClass;
use bytes::Bytes;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

/// Terminal state of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered(u16),
    Rejected(u16),
    TransportFailed(String),
    TimedOut,
    InvalidUri(String),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAttempt {
    pub uri: String,
    pub outcome: DeliveryOutcome,
}

/// Outcomes of one fan-out to a subscriber class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempts: Vec<DeliveryAttempt>,
    /// Attempts whose task panicked before reporting an outcome.
    pub lost: usize,
}

impl DeliveryReport {
    /// Number of attempts that reached a terminal state.
    pub fn total(&self) -> usize {
        self.attempts.len() + self.lost
    }

    pub fn delivered(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.delivered()
    }

    pub fn outcome_for(&self, uri: &str) -> Option<&DeliveryOutcome> {
        self.attempts
            .iter()
            .find(|a| a.uri == uri)
            .map(|a| &a.outcome)
    }
}

/// Delivers one payload to many subscribers concurrently.
///
/// Every URI gets its own task; a failure is recorded for that URI only and
/// never affects its siblings. No retries are made. Tasks are owned by a
/// `JoinSet`, so dropping the `deliver_all` future aborts any attempt still in
/// flight.
#[derive(Clone)]
pub struct DeliveryDispatcher {
    sender: WebhookSenderHandle,
    timeout: Duration,
}

impl DeliveryDispatcher {
    /// # Arguments
    ///
    /// * `sender` - HTTP transport used for each attempt.
    /// * `timeout` - Budget for a single attempt.
    pub fn new(sender: WebhookSenderHandle, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    /// Sends `payload` to every URI and waits until all attempts are terminal.
    pub async fn deliver_all(
        &self,
        class: SubscriberClass,
        uris: Vec<String>,
        payload: Bytes,
    ) -> DeliveryReport {
        let mut attempts = JoinSet::new();
        for uri in uris {
            let sender = self.sender.clone();
            let payload = payload.clone();
            let timeout = self.timeout;
            attempts.spawn(async move {
                let outcome = attempt(&sender, &uri, payload, timeout).await;
                log_outcome(class, &uri, &outcome);
                DeliveryAttempt { uri, outcome }
            });
        }

        let mut report = DeliveryReport::default();
        while let Some(joined) = attempts.join_next().await {
            match joined {
                Ok(attempt) => report.attempts.push(attempt),
                Err(e) => {
                    tracing::error!(%class, error = %e, "delivery task did not complete");
                    report.lost += 1;
                }
            }
        }

        tracing::info!(
            %class,
            total = report.total(),
            delivered = report.delivered(),
            failed = report.failed(),
            "fan-out complete"
        );
        report
    }
}

/// Parses a subscriber URI, accepting only absolute http(s) URLs.
pub fn parse_subscriber_uri(uri: &str) -> Result<Url, String> {
    let url = Url::parse(uri).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!("unsupported scheme '{}'", scheme)),
    }
}

async fn attempt(
    sender: &WebhookSenderHandle,
    uri: &str,
    payload: Bytes,
    timeout: Duration,
) -> DeliveryOutcome {
    let url = match parse_subscriber_uri(uri) {
        Ok(url) => url,
        Err(reason) => return DeliveryOutcome::InvalidUri(reason),
    };

    match tokio::time::timeout(timeout, sender.post_json(&url, payload)).await {
        Ok(Ok(status)) if (200..300).contains(&status) => DeliveryOutcome::Delivered(status),
        Ok(Ok(status)) => DeliveryOutcome::Rejected(status),
        Ok(Err(e)) => DeliveryOutcome::TransportFailed(e.to_string()),
        Err(_) => DeliveryOutcome::TimedOut,
    }
}

fn log_outcome(class: SubscriberClass, uri: &str, outcome: &DeliveryOutcome) {
    match outcome {
        DeliveryOutcome::Delivered(status) => {
            tracing::debug!(%class, uri, status, "delivered")
        }
        DeliveryOutcome::Rejected(status) => {
            tracing::warn!(%class, uri, status, "subscriber rejected delivery")
        }
        DeliveryOutcome::TransportFailed(error) => {
            tracing::warn!(%class, uri, error = %error, "delivery failed")
        }
        DeliveryOutcome::TimedOut => tracing::warn!(%class, uri, "delivery timed out"),
        DeliveryOutcome::InvalidUri(reason) => {
            tracing::warn!(%class, uri, reason = %reason, "skipping malformed subscriber uri")
        }
    }
}
