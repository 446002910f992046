use super::account::AccountResource;
use super::money::{DOMESTIC_SYMBOL, format_currency};
use super::transaction::TransactionResource;
use serde::{Deserialize, Serialize};

/// Condensed notice sent to formatted subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedEvent {
    pub transaction_description: String,
    pub transaction_amount: String,
    pub account_balance: String,
}

/// Unfiltered mirror sent to raw subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub account: AccountResource,
    pub transaction: TransactionResource,
}

/// Canonical record re-published for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepublishEnvelope {
    pub account: AccountResource,
    pub transaction: TransactionResource,
}

/// Builds the formatted notice for a debit.
///
/// The foreign amount is rendered when present, otherwise the domestic amount.
/// Returns `None` when the chosen amount is not a debit.
pub fn build_formatted_event(
    account: &AccountResource,
    transaction: &TransactionResource,
) -> Option<FormattedEvent> {
    let attributes = &transaction.attributes;
    let transaction_amount = match &attributes.foreign_amount {
        Some(foreign) => format_currency(foreign.debit_magnitude()?, &foreign.currency_code),
        None => format!("{}{}", DOMESTIC_SYMBOL, attributes.amount.debit_magnitude()?),
    };

    Some(FormattedEvent {
        transaction_description: attributes.description.clone(),
        transaction_amount,
        account_balance: account.balance_value().to_string(),
    })
}

pub fn build_raw_event(account: &AccountResource, transaction: &TransactionResource) -> RawEvent {
    RawEvent {
        account: account.clone(),
        transaction: transaction.clone(),
    }
}

pub fn build_republish_envelope(
    account: &AccountResource,
    transaction: &TransactionResource,
) -> RepublishEnvelope {
    RepublishEnvelope {
        account: account.clone(),
        transaction: transaction.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountType;
    use crate::domain::money::MoneyObject;
    use chrono::DateTime;

    fn account() -> AccountResource {
        AccountResource::new(
            "acc-1",
            AccountType::Transactional,
            MoneyObject::new("AUD", "95.00"),
        )
    }

    fn transaction(value: &str) -> TransactionResource {
        TransactionResource::new(
            "tx-1",
            "acc-1",
            "Coffee",
            MoneyObject::new("AUD", value),
            DateTime::parse_from_rfc3339("2023-05-02T08:15:00+10:00").unwrap(),
        )
    }

    #[test]
    fn test_domestic_debit() {
        let event = build_formatted_event(&account(), &transaction("-1200")).unwrap();
        assert_eq!(event.transaction_amount, "$1200");
        assert_eq!(event.transaction_description, "Coffee");
        assert_eq!(event.account_balance, "95.00");
    }

    #[test]
    fn test_non_debits_are_skipped() {
        for value in ["", "1200", "0", "+5", "0-1"] {
            assert!(build_formatted_event(&account(), &transaction(value)).is_none());
        }
    }

    #[test]
    fn test_foreign_amount_takes_precedence() {
        let tx = transaction("-10.00").with_foreign_amount(MoneyObject::new("JPY", "-1000"));
        let event = build_formatted_event(&account(), &tx).unwrap();
        assert_eq!(event.transaction_amount, "¥1000");

        let tx = transaction("-10.00").with_foreign_amount(MoneyObject::new("EUR", "-6.10"));
        let event = build_formatted_event(&account(), &tx).unwrap();
        assert_eq!(event.transaction_amount, "6.10 EUR");
    }

    #[test]
    fn test_foreign_credit_is_skipped_even_if_domestic_is_debit() {
        let tx = transaction("-10.00").with_foreign_amount(MoneyObject::new("JPY", "1000"));
        assert!(build_formatted_event(&account(), &tx).is_none());
    }

    #[test]
    fn test_wire_shapes() {
        let event = build_formatted_event(&account(), &transaction("-500")).unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "transaction_description": "Coffee",
                "transaction_amount": "$500",
                "account_balance": "95.00"
            })
        );

        let raw = serde_json::to_value(build_raw_event(&account(), &transaction("5"))).unwrap();
        assert_eq!(raw["account"]["id"], "acc-1");
        assert_eq!(raw["transaction"]["id"], "tx-1");

        let envelope =
            serde_json::to_value(build_republish_envelope(&account(), &transaction("5"))).unwrap();
        assert_eq!(envelope["Account"]["id"], "acc-1");
        assert_eq!(envelope["Transaction"]["attributes"]["amount"]["value"], "5");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let (a, t) = (account(), transaction("-42"));
        let first = serde_json::to_vec(&build_formatted_event(&a, &t)).unwrap();
        let second = serde_json::to_vec(&build_formatted_event(&a, &t)).unwrap();
        assert_eq!(first, second);

        let first = serde_json::to_vec(&build_raw_event(&a, &t)).unwrap();
        let second = serde_json::to_vec(&build_raw_event(&a, &t)).unwrap();
        assert_eq!(first, second);
    }
}
