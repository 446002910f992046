use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Symbol used for amounts without a foreign currency attached.
pub const DOMESTIC_SYMBOL: &str = "$";

/// A monetary value as reported by the banking API.
///
/// `value` is kept as the exact string the API sent so that raw mirrors and
/// rendered amounts never go through a lossy numeric conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyObject {
    pub currency_code: String,
    pub value: String,
    #[serde(default)]
    pub value_in_base_units: i64,
}

impl MoneyObject {
    /// Builds a money value, deriving `value_in_base_units` from the decimal
    /// `value` and the currency's minor units. Unparseable values get zero.
    pub fn new(currency_code: impl Into<String>, value: impl Into<String>) -> Self {
        let currency_code = currency_code.into();
        let value = value.into();
        let value_in_base_units = base_units(&value, &currency_code).unwrap_or_default();
        Self {
            currency_code,
            value,
            value_in_base_units,
        }
    }

    /// Returns the unsigned amount text if this value is a debit.
    ///
    /// Empty values and values without a leading minus sign are not debits.
    pub fn debit_magnitude(&self) -> Option<&str> {
        self.value.strip_prefix('-')
    }
}

/// Currencies with a known display symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Aud,
    Jpy,
    Sgd,
    Krw,
    Twd,
}

impl Currency {
    /// Looks up a currency by its ISO code, ignoring case.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "AUD" => Some(Self::Aud),
            "JPY" => Some(Self::Jpy),
            "SGD" => Some(Self::Sgd),
            "KRW" => Some(Self::Krw),
            "TWD" => Some(Self::Twd),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Aud => DOMESTIC_SYMBOL,
            Self::Jpy => "¥",
            Self::Sgd => "S$",
            Self::Krw => "₩",
            Self::Twd => "NT$",
        }
    }

    /// Number of decimal places in one unit of this currency.
    pub fn minor_units(self) -> u32 {
        match self {
            Self::Jpy | Self::Krw => 0,
            Self::Aud | Self::Sgd | Self::Twd => 2,
        }
    }
}

fn base_units(value: &str, currency_code: &str) -> Option<i64> {
    let minor_units = Currency::from_code(currency_code).map_or(2, Currency::minor_units);
    let amount = Decimal::from_str(value.trim()).ok()?;
    amount
        .checked_mul(Decimal::from(10_i64.pow(minor_units)))?
        .trunc()
        .to_i64()
}

/// Renders an unsigned amount for display.
///
/// Known currencies are prefixed with their symbol. Anything else falls back to
/// `"<amount> <CODE>"` with the code uppercased.
pub fn format_currency(amount: &str, currency_code: &str) -> String {
    match Currency::from_code(currency_code) {
        Some(currency) => format!("{}{}", currency.symbol(), amount),
        None => format!("{} {}", amount, currency_code.to_ascii_uppercase()),
    }
}
