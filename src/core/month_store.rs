use std::collections::BTreeMap;

use super::{month::MonthKey, transaction::Amount};

/// Running totals of a single month bucket
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct MonthTotals {
    pub(crate) transaction_count: u64,
    pub(crate) credit_total: Amount,
    pub(crate) debit_total: Amount,
}

impl MonthTotals {
    /// Counts transaction and adds its value to the credit or debit side.
    /// Zero values are counted only.
    pub fn record(&mut self, value: Amount) {
        self.transaction_count += 1;

        if value > Amount::ZERO {
            self.credit_total += value;
        } else if value < Amount::ZERO {
            self.debit_total += value;
        }
    }
}

pub trait Store {
    /// Returns existing totals or creates empty ones if month was not seen yet
    fn get_mut_or_new(&mut self, key: MonthKey) -> &mut MonthTotals;

    /// Consumes store returning months in ascending key order
    fn into_sorted(self) -> Vec<(MonthKey, MonthTotals)>;
}

#[derive(Default)]
pub struct MonthStore {
    months: BTreeMap<MonthKey, MonthTotals>,
}

impl Store for MonthStore {
    fn get_mut_or_new(&mut self, key: MonthKey) -> &mut MonthTotals {
        self.months.entry(key).or_default()
    }

    fn into_sorted(self) -> Vec<(MonthKey, MonthTotals)> {
        self.months.into_iter().collect()
    }
}
