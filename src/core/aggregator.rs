use super::{
    month_store::{self, MonthStore},
    report::{MonthSummary, Report},
    transaction::{Amount, Transaction},
};

/// [`Aggregator`] folds transactions into per-month totals and overall balance
///
/// Every transaction is bucketed by its month key, month store keeps the
/// running totals of each bucket. Once all transactions are added, buckets are
/// turned into [`MonthSummary`] rows in ascending month order.
///
///    Transaction
///         │
/// ┌───────▼────────┐
/// │                 │
/// │   Aggregator    │──── total balance
/// │                 │
/// └───────┬─────────┘
///         │ MonthKey, value
///         │
/// ┌───────▼────────┐
/// │                 │
/// │   Month Store   │
/// │                 │
/// └───────┬─────────┘
///         │ MonthTotals
///         │
/// ┌───────▼────────┐
/// │                 │
/// │     Report      │
/// │                 │
/// └─────────────────┘
#[derive(Default)]
pub struct Aggregator<S>
where
    S: month_store::Store,
{
    months: S,
    total_balance: Amount,
}

impl<S> Aggregator<S>
where
    S: month_store::Store,
{
    pub fn add(&mut self, transaction: &Transaction) {
        let key = transaction.month_key();

        self.total_balance += transaction.value;
        self.months.get_mut_or_new(key).record(transaction.value);
    }

    pub fn finish(self) -> Report {
        let rows = self
            .months
            .into_sorted()
            .into_iter()
            .map(|(key, totals)| MonthSummary::new(key, totals))
            .collect();

        Report {
            rows,
            total_balance: self.total_balance,
        }
    }
}

/// Builds report of given transactions, malformed dates end up in the `Unknown` row
pub fn aggregate<'a, I>(transactions: I) -> Report
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut aggregator = Aggregator::<MonthStore>::default();

    transactions
        .into_iter()
        .for_each(|transaction| aggregator.add(transaction));

    aggregator.finish()
}
