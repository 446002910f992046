use crate::domain::transaction::TransactionResource;
use crate::error::Result;
use chrono::{Datelike, Timelike, Weekday};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A single condition a transaction must satisfy to be exported.
pub type Decider = Box<dyn Fn(&TransactionResource) -> bool + Send + Sync>;

/// Conjunction of deciders. An empty filter keeps everything.
#[derive(Default)]
pub struct TransactionFilter {
    deciders: Vec<Decider>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, decider: Decider) -> Self {
        self.deciders.push(decider);
        self
    }

    pub fn matches(&self, transaction: &TransactionResource) -> bool {
        self.deciders.iter().all(|decide| decide(transaction))
    }

    pub fn apply(&self, transactions: Vec<TransactionResource>) -> Vec<TransactionResource> {
        transactions.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Domestic amount in base units within `[min, max]`.
pub fn amount_between(min: i64, max: i64) -> Decider {
    Box::new(move |t: &TransactionResource| {
        (min..=max).contains(&t.attributes.amount.value_in_base_units)
    })
}

/// Created between `min_hour` and `max_hour` inclusive, in the timestamp's own offset.
pub fn hour_between(min_hour: u32, max_hour: u32) -> Decider {
    Box::new(move |t: &TransactionResource| {
        (min_hour..=max_hour).contains(&t.attributes.created_at.hour())
    })
}

/// Created Monday to Friday.
pub fn weekday() -> Decider {
    Box::new(|t: &TransactionResource| {
        !matches!(
            t.attributes.created_at.weekday(),
            Weekday::Sat | Weekday::Sun
        )
    })
}

pub fn not_foreign() -> Decider {
    Box::new(|t: &TransactionResource| !t.is_foreign())
}

pub fn category(category_id: impl Into<String>) -> Decider {
    let category_id = category_id.into();
    Box::new(move |t: &TransactionResource| t.category_id() == Some(category_id.as_str()))
}

/// Writes transactions as a JSON array.
pub fn write_json<W: Write>(writer: W, transactions: &[TransactionResource]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, transactions)?;
    writer.flush()?;
    Ok(())
}

pub fn write_json_file(path: &Path, transactions: &[TransactionResource]) -> Result<()> {
    write_json(File::create(path)?, transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::MoneyObject;
    use chrono::DateTime;

    fn transaction(value: &str, created_at: &str) -> TransactionResource {
        TransactionResource::new(
            "tx",
            "acc",
            "Cafe",
            MoneyObject::new("AUD", value),
            DateTime::parse_from_rfc3339(created_at).unwrap(),
        )
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = TransactionFilter::new();
        assert!(filter.matches(&transaction("100.00", "2023-05-06T10:00:00+10:00")));
    }

    #[test]
    fn test_morning_coffee_filter() {
        let filter = TransactionFilter::new()
            .with(amount_between(-700, -400))
            .with(hour_between(6, 12))
            .with(weekday())
            .with(not_foreign());

        // Tuesday 08:15 local, -$4.50.
        assert!(filter.matches(&transaction("-4.50", "2023-05-02T08:15:00+10:00")));
        // Too expensive.
        assert!(!filter.matches(&transaction("-8.00", "2023-05-02T08:15:00+10:00")));
        // Evening.
        assert!(!filter.matches(&transaction("-4.50", "2023-05-02T19:00:00+10:00")));
        // Saturday.
        assert!(!filter.matches(&transaction("-4.50", "2023-05-06T08:15:00+10:00")));
        // Bought abroad.
        let abroad = transaction("-4.50", "2023-05-02T08:15:00+10:00")
            .with_foreign_amount(MoneyObject::new("JPY", "-450"));
        assert!(!filter.matches(&abroad));
    }

    #[test]
    fn test_category_filter() {
        let filter = TransactionFilter::new().with(category("restaurants-and-cafes"));
        let tagged = transaction("-4.50", "2023-05-02T08:15:00+10:00")
            .with_category("restaurants-and-cafes");
        let untagged = transaction("-4.50", "2023-05-02T08:15:00+10:00");

        assert_eq!(filter.apply(vec![tagged, untagged]).len(), 1);
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&mut out, &[transaction("-1.00", "2023-05-02T08:15:00+10:00")]).unwrap();

        let parsed: Vec<TransactionResource> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].attributes.amount.value, "-1.00");
    }
}
