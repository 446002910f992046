use super::transaction::ResourceIdentifier;
use serde::{Deserialize, Serialize};

/// Kind of notification sent by the banking API's webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum EventType {
    TransactionCreated,
    TransactionSettled,
    TransactionDeleted,
    Ping,
    Other(String),
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TRANSACTION_CREATED" => Self::TransactionCreated,
            "TRANSACTION_SETTLED" => Self::TransactionSettled,
            "TRANSACTION_DELETED" => Self::TransactionDeleted,
            "PING" => Self::Ping,
            _ => Self::Other(value),
        }
    }
}

/// A missing or `null` event type is kept as an empty unknown type.
impl From<Option<String>> for EventType {
    fn from(value: Option<String>) -> Self {
        Self::from(value.unwrap_or_default())
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::TransactionCreated => "TRANSACTION_CREATED".to_string(),
            EventType::TransactionSettled => "TRANSACTION_SETTLED".to_string(),
            EventType::TransactionDeleted => "TRANSACTION_DELETED".to_string(),
            EventType::Ping => "PING".to_string(),
            EventType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WebhookEventAttributes {
    #[serde(rename = "eventType", alias = "event_type", default)]
    pub event_type: EventType,
    #[serde(rename = "createdAt", alias = "created_at", default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionReference {
    #[serde(default)]
    pub data: Option<ResourceIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WebhookEventRelationships {
    #[serde(default)]
    pub transaction: Option<TransactionReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEventResource {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: WebhookEventAttributes,
    #[serde(default)]
    pub relationships: WebhookEventRelationships,
}

/// The notification body the banking API posts for every account event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEventCallback {
    pub data: WebhookEventResource,
}

impl WebhookEventCallback {
    pub fn new(event_type: EventType, transaction_id: Option<&str>) -> Self {
        Self {
            data: WebhookEventResource {
                kind: "webhook-events".to_string(),
                id: String::new(),
                attributes: WebhookEventAttributes {
                    event_type,
                    created_at: None,
                },
                relationships: WebhookEventRelationships {
                    transaction: transaction_id.map(|id| TransactionReference {
                        data: Some(ResourceIdentifier::new("transactions", id)),
                    }),
                },
            },
        }
    }

    pub fn event_type(&self) -> &EventType {
        &self.data.attributes.event_type
    }

    /// Id of the transaction this event refers to, if any.
    pub fn transaction_id(&self) -> Option<&str> {
        self.data
            .relationships
            .transaction
            .as_ref()
            .and_then(|reference| reference.data.as_ref())
            .map(|data| data.id.as_str())
    }
}
