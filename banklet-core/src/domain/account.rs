//! Account domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::{format_timestamp, parse_timestamp, split_fields};

/// Header line of the account file
pub const ACCOUNTS_HEADER: &str = "Account Number,Name,PasswordHash,Balance,Date Created";

/// A six-digit account number in `[100000, 999999]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AccountNumber(u32);

impl AccountNumber {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;
    /// Number of distinct account numbers
    pub const SPACE: usize = (Self::MAX - Self::MIN + 1) as usize;

    pub fn new(value: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Uniform random draw from the whole range
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // u32 parsing accepts a leading '+', stored numbers never have one
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid account number: {s:?}"));
        }
        s.parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("account number out of range: {s}"))
    }
}

impl TryFrom<u32> for AccountNumber {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("account number out of range: {value}"))
    }
}

impl From<AccountNumber> for u32 {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

/// A bank account as stored in the account file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_number: AccountNumber,
    pub name: String,
    /// Never serialized, digests stay on disk
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub balance: Decimal,
    pub created_at: NaiveDateTime,
}

/// A data line split into the fields login and balance updates rely on
///
/// The creation date stays raw text, so a record whose date does not parse
/// can still log in and have its balance updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountEntry<'a> {
    pub account_number: AccountNumber,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub balance: Decimal,
    pub created_at: &'a str,
}

impl<'a> AccountEntry<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let [number, name, password_hash, balance, created_at] = split_fields(line)?;
        Some(Self {
            account_number: number.parse().ok()?,
            name,
            password_hash,
            balance: balance.parse().ok()?,
            created_at,
        })
    }

    /// The same line with the balance replaced, other fields verbatim
    pub fn with_balance(&self, balance: Decimal) -> String {
        format!(
            "{},{},{},{},{}",
            self.account_number, self.name, self.password_hash, balance, self.created_at
        )
    }
}

impl Account {
    /// Parse one data line, `None` if the line is malformed or the date is unreadable
    pub fn parse_line(line: &str) -> Option<Self> {
        let entry = AccountEntry::parse(line)?;
        Some(Self {
            account_number: entry.account_number,
            name: entry.name.to_string(),
            password_hash: entry.password_hash.to_string(),
            balance: entry.balance,
            created_at: parse_timestamp(entry.created_at)?,
        })
    }

    /// Render as a data line (without newline)
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.account_number,
            self.name,
            self.password_hash,
            self.balance,
            format_timestamp(&self.created_at)
        )
    }

    /// Leading field of any line parsed as an account number
    ///
    /// Looser than `parse_line`: the rest of the line may be malformed.
    pub fn number_of_line(line: &str) -> Option<AccountNumber> {
        line.split(',').next()?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_number_range() {
        assert!(AccountNumber::new(100_000).is_some());
        assert!(AccountNumber::new(999_999).is_some());
        assert!(AccountNumber::new(99_999).is_none());
        assert!(AccountNumber::new(1_000_000).is_none());
        assert_eq!(AccountNumber::SPACE, 900_000);
    }

    #[test]
    fn test_account_number_parse() {
        assert_eq!("123456".parse::<AccountNumber>().unwrap().get(), 123_456);
        assert_eq!(" 123456 ".parse::<AccountNumber>().unwrap().get(), 123_456);
        assert!("+123456".parse::<AccountNumber>().is_err());
        assert!("12345".parse::<AccountNumber>().is_err());
        assert!("abc".parse::<AccountNumber>().is_err());
        assert!("".parse::<AccountNumber>().is_err());
    }

    #[test]
    fn test_parse_line() {
        let account =
            Account::parse_line("123456,Alice,deadbeef,100.00,2024-01-15 10:30:00").unwrap();
        assert_eq!(account.account_number.get(), 123_456);
        assert_eq!(account.name, "Alice");
        assert_eq!(account.password_hash, "deadbeef");
        assert_eq!(account.balance, Decimal::new(10000, 2));
    }

    #[test]
    fn test_parse_line_rejects_malformed() {
        assert!(Account::parse_line(ACCOUNTS_HEADER).is_none());
        assert!(Account::parse_line("123456,Alice,hash,100.00").is_none());
        assert!(Account::parse_line("123456,Alice,hash,lots,2024-01-15 10:30:00").is_none());
        assert!(Account::parse_line("123456,Alice,hash,1,yesterday").is_none());
    }

    #[test]
    fn test_entry_keeps_unreadable_date() {
        let line = "123456,Alice,hash,10,15/01/2024";
        let entry = AccountEntry::parse(line).unwrap();
        assert_eq!(entry.account_number.get(), 123_456);
        assert_eq!(entry.balance, Decimal::TEN);
        assert_eq!(entry.created_at, "15/01/2024");
        assert_eq!(entry.with_balance(Decimal::new(25, 1)), "123456,Alice,hash,2.5,15/01/2024");

        assert!(AccountEntry::parse("123456,Alice,hash,ten,15/01/2024").is_none());
        assert!(AccountEntry::parse("123456,Alice,hash,10").is_none());
    }

    #[test]
    fn test_line_round_trip() {
        let line = "654321,Bob,cafe,150.0,2024-02-01 08:00:05";
        assert_eq!(Account::parse_line(line).unwrap().to_line(), line);
    }

    #[test]
    fn test_number_of_line_is_loose() {
        assert_eq!(
            Account::number_of_line("123456,broken").map(AccountNumber::get),
            Some(123_456)
        );
        assert!(Account::number_of_line(ACCOUNTS_HEADER).is_none());
    }

    #[test]
    fn test_serialize_omits_hash() {
        let account =
            Account::parse_line("123456,Alice,secret-digest,1,2024-01-15 10:30:00").unwrap();
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret-digest"));
        assert!(json.contains("\"account_number\":123456"));
    }
}
