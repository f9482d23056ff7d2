//! Banklet Core - account and transaction persistence for a text-file bank
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Core entities (Account, TransactionRecord, Session, etc.)
//! - **ports**: Trait definitions for external dependencies (RecordStore)
//! - **services**: Business logic (ledger, transaction log, teller, doctor)
//! - **adapters**: Concrete implementations (text files, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::TextFileStore;
use config::Config;
use ports::RecordStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result, ValidationError};
pub use domain::{
    Account, AccountNumber, PasswordScheme, Session, TransactionRecord, TransactionType,
};

/// Main context for Banklet operations
///
/// Holds the configuration and all services, wired to one data directory.
pub struct BankContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub ledger: Arc<AccountLedger>,
    pub transaction_log: Arc<TransactionLog>,
    pub teller: TellerService,
    pub doctor: DoctorService,
}

impl BankContext {
    /// Open the data directory, creating both record files if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        let context = Self::open(data_dir)?;
        context.ensure_initialized()?;
        Ok(context)
    }

    /// Open the data directory as it is; nothing is created
    pub fn open(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        Ok(Self::with_store(data_dir, config, Arc::new(TextFileStore::new())))
    }

    /// Wire services over an arbitrary record store without touching it
    pub fn with_store(data_dir: &Path, config: Config, store: Arc<dyn RecordStore>) -> Self {
        let accounts_path = config.accounts_path(data_dir);
        let transactions_path = config.transactions_path(data_dir);
        let hasher = CredentialHasher::new(config.password_scheme, config.argon2.clone());

        let ledger = Arc::new(AccountLedger::new(
            Arc::clone(&store),
            accounts_path.clone(),
            hasher,
        ));
        let transaction_log = Arc::new(TransactionLog::new(
            Arc::clone(&store),
            transactions_path.clone(),
        ));
        let teller = TellerService::new(Arc::clone(&ledger), Arc::clone(&transaction_log));
        let doctor = DoctorService::new(store, accounts_path, transactions_path);

        Self {
            config,
            data_dir: data_dir.to_path_buf(),
            ledger,
            transaction_log,
            teller,
            doctor,
        }
    }

    /// Create both record files with their headers if missing or empty
    pub fn ensure_initialized(&self) -> Result<()> {
        self.ledger.ensure_initialized()?;
        self.transaction_log.ensure_initialized()?;
        Ok(())
    }
}
