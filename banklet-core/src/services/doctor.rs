//! Doctor service - read-only integrity checks over both record files

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use crate::domain::result::{Error, Result};
use crate::domain::record::parse_timestamp;
use crate::domain::{
    AccountEntry, AccountNumber, TransactionRecord, ACCOUNTS_HEADER, TRANSACTIONS_HEADER,
};
use crate::ports::RecordStore;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            message: message.into(),
            details: None,
        }
    }

    /// `pass_message` when `details` is empty, otherwise `status` with details
    fn from_details(
        details: Vec<serde_json::Value>,
        status: CheckStatus,
        pass_message: &str,
        fail_message: impl FnOnce(usize) -> String,
    ) -> Self {
        if details.is_empty() {
            return Self::pass(pass_message);
        }
        Self {
            status,
            message: fail_message(details.len()),
            details: Some(details),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

/// Doctor service for integrity checks
pub struct DoctorService {
    store: Arc<dyn RecordStore>,
    accounts_path: PathBuf,
    transactions_path: PathBuf,
}

impl DoctorService {
    pub fn new(store: Arc<dyn RecordStore>, accounts_path: PathBuf, transactions_path: PathBuf) -> Self {
        Self {
            store,
            accounts_path,
            transactions_path,
        }
    }

    /// Run all checks. Never writes.
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let mut checks = BTreeMap::new();

        let account_lines = self.read_optional(&self.accounts_path)?;
        let transaction_lines = self.read_optional(&self.transactions_path)?;

        checks.insert(
            "accounts_header".to_string(),
            header_check(account_lines.as_deref(), ACCOUNTS_HEADER, "Account"),
        );
        checks.insert(
            "transactions_header".to_string(),
            header_check(transaction_lines.as_deref(), TRANSACTIONS_HEADER, "Transaction"),
        );

        let account_lines = account_lines.unwrap_or_default();
        let transaction_lines = transaction_lines.unwrap_or_default();

        // Accounts
        let mut accounts: Vec<AccountEntry> = Vec::new();
        let mut malformed_accounts = Vec::new();
        let mut unreadable_dates = Vec::new();
        for (index, line) in data_lines(&account_lines) {
            match AccountEntry::parse(line) {
                Some(entry) => {
                    if parse_timestamp(entry.created_at).is_none() {
                        unreadable_dates.push(json!({
                            "line": index + 1,
                            "account_number": entry.account_number,
                        }));
                    }
                    accounts.push(entry);
                }
                None => malformed_accounts.push(json!({ "line": index + 1 })),
            }
        }
        checks.insert(
            "malformed_accounts".to_string(),
            CheckResult::from_details(
                malformed_accounts,
                CheckStatus::Warning,
                "All account records are well-formed",
                |n| format!("{} account line(s) are malformed and will be ignored", n),
            ),
        );

        checks.insert(
            "account_dates".to_string(),
            CheckResult::from_details(
                unreadable_dates,
                CheckStatus::Warning,
                "All account creation dates are readable",
                |n| format!("{} account(s) have an unreadable creation date", n),
            ),
        );

        let mut seen = HashSet::new();
        let mut duplicates: Vec<AccountNumber> = accounts
            .iter()
            .map(|a| a.account_number)
            .filter(|n| !seen.insert(*n))
            .collect();
        duplicates.sort();
        duplicates.dedup();
        checks.insert(
            "duplicate_account_numbers".to_string(),
            CheckResult::from_details(
                duplicates.iter().map(|n| json!({ "account_number": n })).collect(),
                CheckStatus::Error,
                "All account numbers are unique",
                |n| format!("{} account number(s) appear more than once", n),
            ),
        );

        let negative: Vec<serde_json::Value> = accounts
            .iter()
            .filter(|a| a.balance < Decimal::ZERO)
            .map(|a| json!({ "account_number": a.account_number, "balance": a.balance.to_string() }))
            .collect();
        checks.insert(
            "negative_balances".to_string(),
            CheckResult::from_details(
                negative,
                CheckStatus::Error,
                "No account has a negative balance",
                |n| format!("{} account(s) have a negative balance", n),
            ),
        );

        // Transactions
        let mut transactions = Vec::new();
        let mut malformed_transactions = Vec::new();
        for (index, line) in data_lines(&transaction_lines) {
            match TransactionRecord::parse_line(line) {
                Some(tx) => transactions.push(tx),
                None => malformed_transactions.push(json!({ "line": index + 1 })),
            }
        }
        checks.insert(
            "malformed_transactions".to_string(),
            CheckResult::from_details(
                malformed_transactions,
                CheckStatus::Warning,
                "All transaction records are well-formed",
                |n| format!("{} transaction line(s) are malformed and will be ignored", n),
            ),
        );

        let known: HashSet<AccountNumber> = accounts.iter().map(|a| a.account_number).collect();
        let mut orphaned: Vec<AccountNumber> = transactions
            .iter()
            .map(|tx| tx.account_number)
            .filter(|n| !known.contains(n))
            .collect();
        orphaned.sort();
        orphaned.dedup();
        checks.insert(
            "orphaned_transactions".to_string(),
            CheckResult::from_details(
                orphaned.iter().map(|n| json!({ "account_number": n })).collect(),
                CheckStatus::Warning,
                "No transactions reference missing accounts",
                |n| format!("{} unknown account number(s) referenced by transactions", n),
            ),
        );

        // Latest logged balance per account vs the stored balance
        let latest: HashMap<AccountNumber, Decimal> = transactions
            .iter()
            .map(|tx| (tx.account_number, tx.resulting_balance))
            .collect();
        let mismatched: Vec<serde_json::Value> = accounts
            .iter()
            .filter_map(|a| {
                let logged = latest.get(&a.account_number)?;
                (*logged != a.balance).then(|| {
                    json!({
                        "account_number": a.account_number,
                        "stored": a.balance.to_string(),
                        "logged": logged.to_string(),
                    })
                })
            })
            .collect();
        checks.insert(
            "balance_consistency".to_string(),
            CheckResult::from_details(
                mismatched,
                CheckStatus::Warning,
                "Stored balances match the latest logged transactions",
                |n| format!("{} account(s) differ from their latest logged balance", n),
            ),
        );

        let count = |status: CheckStatus| checks.values().filter(|c| c.status == status).count() as i64;
        let summary = DoctorSummary {
            passed: count(CheckStatus::Pass),
            warnings: count(CheckStatus::Warning),
            errors: count(CheckStatus::Error),
        };

        Ok(DoctorResult { checks, summary })
    }

    fn read_optional(&self, path: &Path) -> Result<Option<Vec<String>>> {
        match self.store.read_all(path) {
            Ok(lines) => Ok(Some(lines)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Non-blank lines after the header, with their zero-based index
fn data_lines(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index, line.as_str()))
}

fn header_check(lines: Option<&[String]>, expected: &str, label: &str) -> CheckResult {
    match lines.and_then(|lines| lines.first()) {
        None if lines.is_none() => CheckResult {
            status: CheckStatus::Error,
            message: format!("{} file not found", label),
            details: None,
        },
        None => CheckResult {
            status: CheckStatus::Error,
            message: format!("{} file is empty", label),
            details: None,
        },
        Some(header) if header.trim() == expected => CheckResult::pass(format!("{} header is valid", label)),
        Some(header) => CheckResult {
            status: CheckStatus::Error,
            message: format!("{} header does not match the expected columns", label),
            details: Some(vec![json!({ "found": header, "expected": expected })]),
        },
    }
}
