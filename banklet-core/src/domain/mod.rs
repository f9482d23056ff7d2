//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with parsing and validation logic - no I/O.

mod account;
mod credential;
pub mod record;
pub mod result;
mod session;
mod transaction;

pub use account::{Account, AccountEntry, AccountNumber, ACCOUNTS_HEADER};
pub use credential::{Argon2Params, PasswordScheme, SALT_LEN};
pub use session::Session;
pub use transaction::{TransactionRecord, TransactionType, TRANSACTIONS_HEADER};
