use super::money::MoneyObject;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Type/id pair pointing at another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub data: ResourceIdentifier,
}

/// A relationship that the API reports as `{"data": null}` when unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionalRelationship {
    pub data: Option<ResourceIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub raw_text: Option<String>,
    pub description: String,
    #[serde(default)]
    pub message: Option<String>,
    pub amount: MoneyObject,
    #[serde(default)]
    pub foreign_amount: Option<MoneyObject>,
    #[serde(default)]
    pub settled_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRelationships {
    pub account: Relationship,
    #[serde(default)]
    pub category: OptionalRelationship,
}

/// A transaction record fetched from the banking API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResource {
    #[serde(rename = "type", default = "transaction_kind")]
    pub kind: String,
    pub id: String,
    pub attributes: TransactionAttributes,
    pub relationships: TransactionRelationships,
}

fn transaction_kind() -> String {
    "transactions".to_string()
}

impl TransactionResource {
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        description: impl Into<String>,
        amount: MoneyObject,
        created_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            kind: transaction_kind(),
            id: id.into(),
            attributes: TransactionAttributes {
                status: "HELD".to_string(),
                raw_text: None,
                description: description.into(),
                message: None,
                amount,
                foreign_amount: None,
                settled_at: None,
                created_at,
            },
            relationships: TransactionRelationships {
                account: Relationship {
                    data: ResourceIdentifier::new("accounts", account_id),
                },
                category: OptionalRelationship::default(),
            },
        }
    }

    pub fn with_foreign_amount(mut self, foreign_amount: MoneyObject) -> Self {
        self.attributes.foreign_amount = Some(foreign_amount);
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.relationships.category.data = Some(ResourceIdentifier::new("categories", category_id));
        self
    }

    pub fn account_id(&self) -> &str {
        &self.relationships.account.data.id
    }

    pub fn category_id(&self) -> Option<&str> {
        self.relationships.category.data.as_ref().map(|c| c.id.as_str())
    }

    pub fn is_foreign(&self) -> bool {
        self.attributes.foreign_amount.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_deserialization() {
        let json = r#"{
            "type": "transactions",
            "id": "tx-1",
            "attributes": {
                "status": "SETTLED",
                "rawText": "SQ *CAFE",
                "description": "Cafe",
                "message": null,
                "amount": {"currencyCode": "AUD", "value": "-4.50", "valueInBaseUnits": -450},
                "foreignAmount": null,
                "settledAt": null,
                "createdAt": "2023-05-02T08:15:00+10:00"
            },
            "relationships": {
                "account": {"data": {"type": "accounts", "id": "acc-1"}},
                "category": {"data": null}
            }
        }"#;

        let tx: TransactionResource = serde_json::from_str(json).unwrap();
        assert_eq!(tx.account_id(), "acc-1");
        assert_eq!(tx.category_id(), None);
        assert!(!tx.is_foreign());
        assert_eq!(tx.attributes.amount.value_in_base_units, -450);
    }

    #[test]
    fn test_missing_category_defaults_to_none() {
        let json = r#"{
            "id": "tx-2",
            "attributes": {
                "description": "Sushi",
                "amount": {"currencyCode": "AUD", "value": "-20.00"},
                "foreignAmount": {"currencyCode": "JPY", "value": "-2000"},
                "createdAt": "2023-05-02T08:15:00+09:00"
            },
            "relationships": {"account": {"data": {"type": "accounts", "id": "acc-9"}}}
        }"#;

        let tx: TransactionResource = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, "transactions");
        assert!(tx.is_foreign());
        assert_eq!(tx.category_id(), None);
    }
}
