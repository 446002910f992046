use super::event::WebhookEventCallback;
use crate::error::{RelayError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A single queue message as delivered by a push subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(alias = "messageId", default)]
    pub id: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    #[serde(rename = "publishTime", default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
}

/// Body posted to `/process`: `{"message": {"id": ..., "data": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

impl PushEnvelope {
    /// Wraps raw message bytes the way a push subscription does, with base64 data.
    pub fn wrap(id: impl Into<String>, data: &[u8]) -> Self {
        Self {
            message: PushMessage {
                id: id.into(),
                data: Value::String(STANDARD.encode(data)),
                attributes: HashMap::new(),
                publish_time: None,
            },
            subscription: None,
        }
    }

    /// Parses an envelope from a request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| RelayError::DecodeError(format!("invalid push envelope: {}", e)))
    }

    /// Returns the message payload bytes.
    ///
    /// String data is base64-decoded when it is valid base64 and used as-is
    /// otherwise. Inline JSON objects are re-serialized.
    pub fn payload(&self) -> Result<Vec<u8>> {
        match &self.message.data {
            Value::String(text) => Ok(STANDARD
                .decode(text.as_bytes())
                .unwrap_or_else(|_| text.as_bytes().to_vec())),
            Value::Object(_) => Ok(serde_json::to_vec(&self.message.data)?),
            Value::Null => Err(RelayError::DecodeError(
                "push message carries no data".to_string(),
            )),
            other => Err(RelayError::DecodeError(format!(
                "unsupported push message data: {}",
                other
            ))),
        }
    }

    /// Decodes the webhook event carried by this envelope.
    pub fn decode_event(&self) -> Result<WebhookEventCallback> {
        let payload = self.payload()?;
        serde_json::from_slice(&payload)
            .map_err(|e| RelayError::DecodeError(format!("invalid webhook event: {}", e)))
    }
}

/// Decodes a `/process` request body into the webhook event it carries.
pub fn decode_push_event(body: &[u8]) -> Result<WebhookEventCallback> {
    PushEnvelope::from_slice(body)?.decode_event()
}
