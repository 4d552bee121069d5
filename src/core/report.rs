use serde::{Serialize, Serializer};

use super::{month::MonthKey, month_store::MonthTotals, transaction::Amount};

/// Aggregated statistics of one month
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub month: String,
    pub transaction_count: u64,
    #[serde(serialize_with = "fixed_width_amount")]
    pub debit_total: Amount,
    #[serde(serialize_with = "fixed_width_amount")]
    pub credit_total: Amount,
}

impl MonthSummary {
    pub(crate) fn new(key: MonthKey, totals: MonthTotals) -> Self {
        Self {
            month: key.name().to_string(),
            transaction_count: totals.transaction_count,
            debit_total: totals.debit_total,
            credit_total: totals.credit_total,
        }
    }
}

/// Final structure handed to rendering, months are ordered by month number
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub rows: Vec<MonthSummary>,
    #[serde(serialize_with = "fixed_width_amount")]
    pub total_balance: Amount,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn transaction_count(&self) -> u64 {
        self.rows.iter().map(|row| row.transaction_count).sum()
    }
}

const PRECISION: u32 = 2;

/// Amount as shown to the reader of the statement
pub fn display_amount(amount: &Amount) -> String {
    amount
        .round_dp_with_strategy(
            PRECISION,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        )
        .to_string()
}

pub fn fixed_width_amount<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&display_amount(amount))
}
