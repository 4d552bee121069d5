use std::io;

use csv::StringRecord;

use super::transaction::{Amount, Transaction};

const REQUIRED_HEADERS: [&str; 3] = ["Id", "Date", "Transaction"];

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("Missing `{0}` column in header")]
    MissingHeader(&'static str),
    #[error("Line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: {source}")]
    Record { line: u64, source: csv::Error },
    #[error("Line {line}: batch amounts exceed the supported range")]
    AmountOverflow { line: u64 },
    #[error("Line {line}: invalid month in date `{date}`")]
    InvalidDate { line: u64, date: String },
    #[error("{0}")]
    Csv(#[from] csv::Error),
}

/// How dates without a readable month are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateMode {
    /// Transaction is kept and accounted under the `Unknown` month
    #[default]
    Lenient,
    /// Whole batch is rejected
    Strict,
}

/// Reads all transactions of a batch, any malformed row rejects the whole batch
pub fn read_transactions<R: io::Read>(
    input: R,
    mode: DateMode,
) -> Result<Vec<Transaction>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    validate_headers(&headers)?;

    let mut transactions = Vec::new();
    let mut record = StringRecord::new();
    // bounds every balance and per-month sum the aggregation can reach
    let mut magnitude = Amount::ZERO;

    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |pos| pos.line());

        if record.len() == 1 && record[0].is_empty() {
            continue;
        }

        if record.len() != headers.len() {
            return Err(ParseError::ColumnCount {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let transaction: Transaction = record
            .deserialize(Some(&headers))
            .map_err(|source| ParseError::Record { line, source })?;

        magnitude = magnitude
            .checked_add(transaction.value.abs())
            .ok_or(ParseError::AmountOverflow { line })?;

        if !transaction.has_valid_month() {
            match mode {
                DateMode::Strict => {
                    return Err(ParseError::InvalidDate {
                        line,
                        date: transaction.date,
                    })
                }
                DateMode::Lenient => log::warn!(
                    "Line {}: transaction {} has no valid month in `{}`, accounted as Unknown",
                    line,
                    transaction.id,
                    transaction.date
                ),
            }
        }

        transactions.push(transaction);
    }

    log::debug!("Read {} transactions", transactions.len());

    Ok(transactions)
}

fn validate_headers(headers: &StringRecord) -> Result<(), ParseError> {
    REQUIRED_HEADERS
        .iter()
        .find(|required| !headers.iter().any(|header| header == **required))
        .map_or(Ok(()), |missing| Err(ParseError::MissingHeader(*missing)))
}
