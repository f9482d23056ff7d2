//! Teller service - session operations on top of the ledger and the log
//!
//! The session balance is the working copy during a login; the ledger is
//! only written when the session is closed.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::result::{Result, ValidationError};
use crate::domain::{AccountNumber, Session, TransactionRecord, TransactionType};

use super::{AccountLedger, TransactionLog};

/// Parse user input as a monetary amount
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .map_err(|_| ValidationError::InvalidAmount(text.to_string()).into())
}

/// Session-level banking operations
pub struct TellerService {
    ledger: Arc<AccountLedger>,
    log: Arc<TransactionLog>,
}

impl TellerService {
    pub fn new(ledger: Arc<AccountLedger>, log: Arc<TransactionLog>) -> Self {
        Self { ledger, log }
    }

    /// Log in, `Ok(None)` on bad credentials
    pub fn open_session(&self, account_number: AccountNumber, password: &str) -> Result<Option<Session>> {
        self.ledger.login(account_number, password)
    }

    pub fn balance(&self, session: &Session) -> Decimal {
        session.balance
    }

    /// Add `amount` to the session balance and log a deposit
    pub fn deposit(&self, session: &mut Session, amount: Decimal) -> Result<TransactionRecord> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount.into());
        }

        let new_balance = session
            .balance
            .checked_add(amount)
            .ok_or(ValidationError::AmountTooLarge)?;
        let record = self.log.record(
            session.account_number,
            TransactionType::Deposit,
            amount,
            new_balance,
        )?;
        session.balance = new_balance;
        Ok(record)
    }

    /// Take `amount` from the session balance and log a withdrawal
    ///
    /// Rejected withdrawals leave the balance alone and log nothing.
    pub fn withdraw(&self, session: &mut Session, amount: Decimal) -> Result<TransactionRecord> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount.into());
        }
        if amount > session.balance {
            return Err(ValidationError::InsufficientFunds {
                requested: amount,
                available: session.balance,
            }
            .into());
        }

        let new_balance = session
            .balance
            .checked_sub(amount)
            .ok_or(ValidationError::AmountTooLarge)?;
        let record = self.log.record(
            session.account_number,
            TransactionType::Withdrawal,
            amount,
            new_balance,
        )?;
        session.balance = new_balance;
        Ok(record)
    }

    /// Transactions of the session's account, oldest first
    pub fn mini_statement(&self, session: &Session) -> Result<Vec<TransactionRecord>> {
        self.log.mini_statement(session.account_number)
    }

    /// Write the session balance back to the ledger and end the session
    pub fn close_session(&self, session: Session) -> Result<()> {
        self.ledger.update_balance(session.account_number, session.balance)?;
        tracing::info!(account = %session.account_number, "session closed");
        Ok(())
    }
}
