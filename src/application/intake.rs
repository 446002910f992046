use crate::domain::ports::{MessagePublisherHandle, SignatureVerifierHandle};
use crate::error::{RelayError, Result};
use bytes::Bytes;

/// Accepts signed webhook calls from the banking API and queues them on the
/// intake topic for later processing.
pub struct IntakeService {
    verifier: Option<SignatureVerifierHandle>,
    publisher: MessagePublisherHandle,
    topic: String,
}

impl IntakeService {
    /// Creates an intake service.
    ///
    /// Without a verifier every call is rejected.
    pub fn new(
        verifier: Option<SignatureVerifierHandle>,
        publisher: MessagePublisherHandle,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            publisher,
            topic: topic.into(),
        }
    }

    /// Verifies the body's signature and publishes it unchanged.
    ///
    /// Returns the id of the queued message.
    pub async fn accept(&self, body: Bytes, signature: Option<&str>) -> Result<String> {
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            RelayError::SignatureError("no webhook secret configured".to_string())
        })?;
        let signature = signature
            .ok_or_else(|| RelayError::SignatureError("missing signature header".to_string()))?;
        if !verifier.verify(&body, signature) {
            return Err(RelayError::SignatureError(
                "signature does not match body".to_string(),
            ));
        }

        let message_id = self.publisher.publish(&self.topic, body).await?;
        tracing::info!(topic = %self.topic, message_id = %message_id, "queued webhook event");
        Ok(message_id)
    }
}
