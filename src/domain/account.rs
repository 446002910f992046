use super::money::MoneyObject;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Classification of an account as reported by the banking API.
///
/// Unrecognised values are kept in `Other` so they survive a raw mirror unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountType {
    Transactional,
    Saver,
    HomeLoan,
    Other(String),
}

impl From<String> for AccountType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TRANSACTIONAL" => Self::Transactional,
            "SAVER" => Self::Saver,
            "HOME_LOAN" => Self::HomeLoan,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for AccountType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AccountType> for String {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Transactional => "TRANSACTIONAL".to_string(),
            AccountType::Saver => "SAVER".to_string(),
            AccountType::HomeLoan => "HOME_LOAN".to_string(),
            AccountType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAttributes {
    #[serde(default)]
    pub display_name: String,
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership_type: Option<String>,
    pub balance: MoneyObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// An account record fetched from the banking API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResource {
    #[serde(rename = "type", default = "account_kind")]
    pub kind: String,
    pub id: String,
    pub attributes: AccountAttributes,
}

fn account_kind() -> String {
    "accounts".to_string()
}

impl AccountResource {
    pub fn new(id: impl Into<String>, account_type: AccountType, balance: MoneyObject) -> Self {
        Self {
            kind: account_kind(),
            id: id.into(),
            attributes: AccountAttributes {
                display_name: String::new(),
                account_type,
                ownership_type: None,
                balance,
                created_at: None,
            },
        }
    }

    pub fn account_type(&self) -> &AccountType {
        &self.attributes.account_type
    }

    /// The account's current balance exactly as the API reported it.
    pub fn balance_value(&self) -> &str {
        &self.attributes.balance.value
    }
}
