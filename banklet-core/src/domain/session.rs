//! Session domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AccountEntry, AccountNumber};

/// An authenticated user, held by the caller between login and logout
///
/// `balance` is a working copy. The account file is only updated when the
/// session is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub account_number: AccountNumber,
    pub name: String,
    pub balance: Decimal,
}

impl From<&AccountEntry<'_>> for Session {
    fn from(entry: &AccountEntry<'_>) -> Self {
        Self {
            account_number: entry.account_number,
            name: entry.name.to_string(),
            balance: entry.balance,
        }
    }
}
