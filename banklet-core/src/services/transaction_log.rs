//! Transaction log - append-only history of deposits and withdrawals

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::record::now;
use crate::domain::result::Result;
use crate::domain::{AccountNumber, TransactionRecord, TransactionType, TRANSACTIONS_HEADER};
use crate::ports::RecordStore;

/// Append-only transaction log backed by a record store
pub struct TransactionLog {
    store: Arc<dyn RecordStore>,
    path: PathBuf,
}

impl TransactionLog {
    pub fn new(store: Arc<dyn RecordStore>, path: PathBuf) -> Self {
        Self { store, path }
    }

    /// Path of the transaction file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the transaction file with its header if needed
    pub fn ensure_initialized(&self) -> Result<()> {
        self.store.ensure_initialized(&self.path, TRANSACTIONS_HEADER)
    }

    /// Append one transaction stamped with the current time
    pub fn record(
        &self,
        account_number: AccountNumber,
        transaction_type: TransactionType,
        amount: Decimal,
        new_balance: Decimal,
    ) -> Result<TransactionRecord> {
        let record = TransactionRecord {
            account_number,
            transaction_type,
            amount,
            resulting_balance: new_balance,
            timestamp: now(),
        };

        self.ensure_initialized()?;
        self.store.append(&self.path, &record.to_line())?;

        tracing::info!(
            account = %account_number,
            kind = %transaction_type,
            "transaction logged"
        );
        Ok(record)
    }

    /// Transactions of one account, oldest first
    ///
    /// A missing file is `Error::NotFound`; an account without history gives
    /// an empty vector.
    pub fn mini_statement(&self, account_number: AccountNumber) -> Result<Vec<TransactionRecord>> {
        let lines = self.store.read_all(&self.path)?;
        let mut skipped = 0usize;
        let records: Vec<TransactionRecord> = lines
            .iter()
            .skip(1)
            .filter(|line| TransactionRecord::line_belongs_to(line, account_number))
            .filter_map(|line| {
                let parsed = TransactionRecord::parse_line(line);
                if parsed.is_none() {
                    skipped += 1;
                }
                parsed
            })
            .collect();

        if skipped > 0 {
            tracing::warn!(
                skipped,
                account = %account_number,
                "skipped malformed transaction lines"
            );
        }
        Ok(records)
    }

    /// Every well-formed transaction in file order
    pub fn all(&self) -> Result<Vec<TransactionRecord>> {
        let lines = self.store.read_all(&self.path)?;
        Ok(lines
            .iter()
            .skip(1)
            .filter_map(|line| TransactionRecord::parse_line(line))
            .collect())
    }
}
