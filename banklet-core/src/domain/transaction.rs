//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::{format_timestamp, parse_timestamp, split_fields};
use super::AccountNumber;

/// Header line of the transaction file
pub const TRANSACTIONS_HEADER: &str = "Account Number,Transaction Type,Amount,New Balance,Date";

/// Kind of monetary operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Deposit" => Ok(TransactionType::Deposit),
            "Withdrawal" => Ok(TransactionType::Withdrawal),
            other => Err(format!("unknown transaction type: {other:?}")),
        }
    }
}

/// One line of the append-only transaction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub account_number: AccountNumber,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    /// Account balance right after this transaction
    pub resulting_balance: Decimal,
    pub timestamp: NaiveDateTime,
}

impl TransactionRecord {
    /// Parse one data line, `None` if the line is malformed
    pub fn parse_line(line: &str) -> Option<Self> {
        let [number, kind, amount, balance, timestamp] = split_fields(line)?;
        Some(Self {
            account_number: number.parse().ok()?,
            transaction_type: kind.parse().ok()?,
            amount: amount.parse().ok()?,
            resulting_balance: balance.parse().ok()?,
            timestamp: parse_timestamp(timestamp)?,
        })
    }

    /// Render as a data line (without newline)
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.account_number,
            self.transaction_type,
            self.amount,
            self.resulting_balance,
            format_timestamp(&self.timestamp)
        )
    }

    /// True if the line's first field is exactly `number`
    ///
    /// Field-aware: "1234" never matches a query for "123".
    pub fn line_belongs_to(line: &str, number: AccountNumber) -> bool {
        line.split(',')
            .next()
            .map(|field| field.trim() == number.to_string())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_strings() {
        assert_eq!(TransactionType::Deposit.to_string(), "Deposit");
        assert_eq!("Withdrawal".parse::<TransactionType>().unwrap(), TransactionType::Withdrawal);
        assert!("deposit".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_parse_line() {
        let tx = TransactionRecord::parse_line("123456,Deposit,50,150.00,2024-01-15 10:30:00")
            .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Deposit);
        assert_eq!(tx.amount, Decimal::new(50, 0));
        assert_eq!(tx.resulting_balance, Decimal::new(15000, 2));
        assert_eq!(
            tx.to_line(),
            "123456,Deposit,50,150.00,2024-01-15 10:30:00"
        );
    }

    #[test]
    fn test_parse_line_rejects_malformed() {
        assert!(TransactionRecord::parse_line(TRANSACTIONS_HEADER).is_none());
        assert!(TransactionRecord::parse_line("123456,Refund,5,5,2024-01-15 10:30:00").is_none());
        assert!(TransactionRecord::parse_line("123456,Deposit,5,5").is_none());
    }

    #[test]
    fn test_line_belongs_to_is_exact() {
        let number = AccountNumber::new(123_456).unwrap();
        assert!(TransactionRecord::line_belongs_to("123456,Deposit,1,1,x", number));
        assert!(!TransactionRecord::line_belongs_to("1234567,Deposit,1,1,x", number));
        assert!(!TransactionRecord::line_belongs_to("", number));
    }
}
