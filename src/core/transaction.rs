use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::month::MonthKey;

pub type TransactionID = i64;
pub type Amount = Decimal;

/// Represents model of incoming transaction
///
/// Positive value is a credit, negative value is a debit, zero is neither.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    #[serde(rename = "Id")]
    pub id: TransactionID,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Transaction", with = "rust_decimal::serde::str")]
    pub value: Amount,
}

impl Transaction {
    pub fn new(id: TransactionID, date: impl Into<String>, value: Amount) -> Self {
        Self {
            id,
            date: date.into(),
            value,
        }
    }

    /// Month bucket derived from the `M/D/YYYY` date, malformed dates map to [`MonthKey::UNKNOWN`]
    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(&self.date)
    }

    pub fn has_valid_month(&self) -> bool {
        self.month_key().is_known()
    }
}
