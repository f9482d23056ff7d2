//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod credential;
mod doctor;
pub mod ledger;
mod teller;
mod transaction_log;

pub use credential::CredentialHasher;
pub use doctor::{CheckResult, CheckStatus, DoctorResult, DoctorService, DoctorSummary};
pub use ledger::{generate_account_number, AccountLedger};
pub use teller::{parse_amount, TellerService};
pub use transaction_log::TransactionLog;
