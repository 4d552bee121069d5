use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use crate::core::transaction::Transaction;

use super::TransportError;

/// Keeps raw transactions of processed batches for audit
pub trait TransactionRepository {
    fn save_batch(&mut self, transactions: &[Transaction]) -> Result<(), TransportError>;
}

/// Used when audit persistence is turned off
#[derive(Default)]
pub struct NoopRepository;

impl TransactionRepository for NoopRepository {
    fn save_batch(&mut self, _transactions: &[Transaction]) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Appends transactions to a csv file with the same columns as the input
pub struct CsvAuditRepository {
    path: PathBuf,
}

impl CsvAuditRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist_error(&self, source: csv::Error) -> TransportError {
        TransportError::Persist {
            path: self.path.clone(),
            source,
        }
    }
}

impl TransactionRepository for CsvAuditRepository {
    fn save_batch(&mut self, transactions: &[Transaction]) -> Result<(), TransportError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| self.persist_error(err.into()))?;

        let is_new = file
            .metadata()
            .map_err(|err| self.persist_error(err.into()))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);

        for transaction in transactions {
            writer
                .serialize(transaction)
                .map_err(|err| self.persist_error(err))?;
        }

        writer
            .flush()
            .map_err(|err| self.persist_error(err.into()))?;

        log::info!(
            "Persisted {} transactions to {:?}",
            transactions.len(),
            self.path()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal_macros::dec;

    use super::{CsvAuditRepository, NoopRepository, TransactionRepository};
    use crate::core::{
        reader::{read_transactions, DateMode},
        transaction::Transaction,
    };

    #[test]
    fn appends_batches_with_single_header() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut repository = CsvAuditRepository::new(dir.path().join("audit.csv"));

        repository.save_batch(&[
            Transaction::new(1, "1/5/2023", dec!(100.0)),
            Transaction::new(2, "1/20/2023", dec!(-40.0)),
        ])?;
        repository.save_batch(&[Transaction::new(3, "2/1/2023", dec!(50.0))])?;

        let content = fs::read_to_string(repository.path())?;

        assert_eq!(
            content,
            "Id,Date,Transaction\n1,1/5/2023,100.0\n2,1/20/2023,-40.0\n3,2/1/2023,50.0\n"
        );

        Ok(())
    }

    #[test]
    fn audit_file_can_be_read_back() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut repository = CsvAuditRepository::new(dir.path().join("audit.csv"));
        let batch = vec![
            Transaction::new(7, "bad date", dec!(0)),
            Transaction::new(8, "12/24/2023", dec!(-12.34)),
        ];

        repository.save_batch(&batch)?;

        let content = fs::read(repository.path())?;
        assert_eq!(read_transactions(content.as_slice(), DateMode::Lenient)?, batch);

        Ok(())
    }

    #[test]
    fn unwritable_path_is_persist_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut repository = CsvAuditRepository::new(dir.path().join("missing/audit.csv"));

        assert!(repository
            .save_batch(&[Transaction::new(1, "1/1/2023", dec!(1))])
            .is_err());

        Ok(())
    }

    #[test]
    fn noop_repository_accepts_everything() {
        assert!(NoopRepository
            .save_batch(&[Transaction::new(1, "1/1/2023", dec!(1))])
            .is_ok());
    }
}
