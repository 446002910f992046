use super::account::AccountType;
use super::event::EventType;
use std::fmt;

/// The two disjoint sets of subscriber endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriberClass {
    /// Receives a condensed, human-readable notice of debits.
    Formatted,
    /// Receives every enriched account/transaction pair unfiltered.
    Raw,
}

impl SubscriberClass {
    pub const ALL: [SubscriberClass; 2] = [SubscriberClass::Formatted, SubscriberClass::Raw];

    /// Name of the collection the subscriber URIs are stored under.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Formatted => "webhooks",
            Self::Raw => "raw-webhooks",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "formatted" | "webhooks" => Some(Self::Formatted),
            "raw" | "raw-webhooks" => Some(Self::Raw),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriberClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Formatted => write!(f, "formatted"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

/// Whether an event may be sent to formatted subscribers.
///
/// Only newly created transactions on the transactional account qualify. The
/// amount-sign check is applied separately when the event is built.
pub fn is_eligible_for_formatted(event_type: &EventType, account_type: &AccountType) -> bool {
    matches!(
        (event_type, account_type),
        (EventType::TransactionCreated, AccountType::Transactional)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligible(event_type: &str, account_type: &str) -> bool {
        is_eligible_for_formatted(&event_type.into(), &account_type.into())
    }

    #[test]
    fn test_created_transactional_is_eligible() {
        assert!(eligible("TRANSACTION_CREATED", "TRANSACTIONAL"));
    }

    #[test]
    fn test_other_pairings_are_not_eligible() {
        assert!(!eligible("TRANSACTION_CREATED", "SAVER"));
        assert!(!eligible("TRANSACTION_CREATED", "HOME_LOAN"));
        assert!(!eligible("TRANSACTION_SETTLED", "TRANSACTIONAL"));
        assert!(!eligible("TRANSACTION_DELETED", "TRANSACTIONAL"));
        assert!(!eligible("PING", "TRANSACTIONAL"));
        assert!(!eligible("", ""));
        assert!(!eligible("transaction_created", "transactional"));
    }

    #[test]
    fn test_class_parsing() {
        assert_eq!(SubscriberClass::parse("RAW"), Some(SubscriberClass::Raw));
        assert_eq!(
            SubscriberClass::parse("formatted"),
            Some(SubscriberClass::Formatted)
        );
        assert_eq!(SubscriberClass::parse("other"), None);
        assert_eq!(SubscriberClass::Raw.collection(), "raw-webhooks");
    }
}
