//! Account ledger - account creation, login lookup and balance updates

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use rust_decimal::Decimal;

use crate::domain::record::{is_storable_field, now};
use crate::domain::result::{Error, Result, ValidationError};
use crate::domain::{Account, AccountEntry, AccountNumber, Session, ACCOUNTS_HEADER};
use crate::ports::RecordStore;

use super::CredentialHasher;

/// Random draws allowed per expected draw before falling back to a scan
const RETRY_FACTOR: usize = 10;

/// Draw a fresh account number not present in `existing`
///
/// Draws uniformly at random, at most `10 x ceil(900000 / remaining)` times.
/// If every draw collides it scans upward from a random start, so a free slot
/// is always found while one exists.
pub fn generate_account_number<R: Rng + ?Sized>(
    existing: &HashSet<AccountNumber>,
    rng: &mut R,
) -> Result<AccountNumber> {
    let remaining = AccountNumber::SPACE.saturating_sub(existing.len());
    if remaining == 0 {
        return Err(Error::AccountSpaceExhausted(existing.len()));
    }

    let max_attempts = RETRY_FACTOR * AccountNumber::SPACE.div_ceil(remaining);
    for _ in 0..max_attempts {
        let candidate = AccountNumber::random(rng);
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }

    tracing::warn!(
        attempts = max_attempts,
        in_use = existing.len(),
        "random account number draws exhausted, scanning for a free slot"
    );
    let start = AccountNumber::random(rng).get();
    let span = AccountNumber::MAX - AccountNumber::MIN + 1;
    (0..span)
        .filter_map(|offset| {
            AccountNumber::new(AccountNumber::MIN + (start - AccountNumber::MIN + offset) % span)
        })
        .find(|candidate| !existing.contains(candidate))
        .ok_or(Error::AccountSpaceExhausted(existing.len()))
}

/// Account ledger backed by a record store
pub struct AccountLedger {
    store: Arc<dyn RecordStore>,
    path: PathBuf,
    hasher: CredentialHasher,
}

impl AccountLedger {
    pub fn new(store: Arc<dyn RecordStore>, path: PathBuf, hasher: CredentialHasher) -> Self {
        Self { store, path, hasher }
    }

    /// Path of the account file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the account file with its header if needed
    pub fn ensure_initialized(&self) -> Result<()> {
        self.store.ensure_initialized(&self.path, ACCOUNTS_HEADER)
    }

    /// Validate input and append a new account, returning its number
    pub fn create_account(
        &self,
        name: &str,
        initial_deposit: Decimal,
        password: &str,
    ) -> Result<AccountNumber> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !is_storable_field(name) {
            return Err(ValidationError::InvalidName.into());
        }
        if initial_deposit < Decimal::ZERO {
            return Err(ValidationError::NegativeDeposit.into());
        }
        if password.trim().is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }

        self.ensure_initialized()?;
        let existing = self.existing_numbers()?;
        let account_number = generate_account_number(&existing, &mut rand::thread_rng())?;

        let account = Account {
            account_number,
            name: name.to_string(),
            password_hash: self.hasher.hash(password)?,
            balance: initial_deposit,
            created_at: now(),
        };
        self.store.append(&self.path, &account.to_line())?;

        tracing::info!(account = %account_number, "account created");
        Ok(account_number)
    }

    /// Authenticate and return a session for the matching account
    ///
    /// A wrong number and a wrong password both give `Ok(None)`.
    pub fn login(&self, account_number: AccountNumber, password: &str) -> Result<Option<Session>> {
        let lines = match self.store.read_all(&self.path) {
            Ok(lines) => lines,
            Err(Error::NotFound(path)) => {
                tracing::debug!(path = %path, "login against missing account file");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let session = lines
            .iter()
            .skip(1)
            .filter_map(|line| AccountEntry::parse(line))
            .filter(|entry| entry.account_number == account_number)
            .find(|entry| self.hasher.verify(password, entry.password_hash))
            .map(|entry| Session::from(&entry));

        match &session {
            Some(_) => tracing::info!(account = %account_number, "login succeeded"),
            None => tracing::info!("login failed"),
        }
        Ok(session)
    }

    /// Set the stored balance of one account
    ///
    /// Every other line, malformed ones included, is written back verbatim and
    /// in its original position. An unknown account leaves the file untouched.
    pub fn update_balance(&self, account_number: AccountNumber, new_balance: Decimal) -> Result<()> {
        if new_balance < Decimal::ZERO {
            return Err(ValidationError::NegativeBalance.into());
        }

        let mut lines = self.store.read_all(&self.path)?;
        let target = lines.iter().enumerate().skip(1).find_map(|(index, line)| {
            AccountEntry::parse(line)
                .filter(|entry| entry.account_number == account_number)
                .map(|entry| (index, entry.with_balance(new_balance)))
        });

        let Some((index, updated)) = target else {
            tracing::warn!(account = %account_number, "balance update for unknown account");
            return Err(Error::AccountNotFound(account_number));
        };

        lines[index] = updated;
        self.store.rewrite(&self.path, &lines)?;

        tracing::info!(account = %account_number, "account balance updated");
        Ok(())
    }

    /// Look up one account
    pub fn get_account(&self, account_number: AccountNumber) -> Result<Option<Account>> {
        Ok(self
            .accounts()?
            .into_iter()
            .find(|account| account.account_number == account_number))
    }

    /// All well-formed accounts in file order
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        self.accounts()
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        let lines = self.store.read_all(&self.path)?;
        let mut skipped = 0usize;
        let accounts: Vec<Account> = lines
            .iter()
            .skip(1)
            .filter_map(|line| {
                let parsed = Account::parse_line(line);
                if parsed.is_none() && !line.trim().is_empty() {
                    skipped += 1;
                }
                parsed
            })
            .collect();

        if skipped > 0 {
            tracing::warn!(skipped, path = %self.path.display(), "skipped malformed account lines");
        }
        Ok(accounts)
    }

    fn existing_numbers(&self) -> Result<HashSet<AccountNumber>> {
        let lines = self.store.read_all(&self.path)?;
        Ok(lines
            .iter()
            .skip(1)
            .filter_map(|line| Account::number_of_line(line))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ledger() -> (Arc<MemoryStore>, AccountLedger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = AccountLedger::new(
            store.clone(),
            PathBuf::from("accounts.txt"),
            CredentialHasher::sha256(),
        );
        (store, ledger)
    }

    fn number(value: u32) -> AccountNumber {
        AccountNumber::new(value).unwrap()
    }

    #[test]
    fn test_generated_numbers_are_unique_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut existing = HashSet::new();
        for _ in 0..2_000 {
            let n = generate_account_number(&existing, &mut rng).unwrap();
            assert!((100_000..=999_999).contains(&n.get()));
            assert!(existing.insert(n), "duplicate number {n}");
        }
    }

    #[test]
    fn test_generator_finds_last_free_slot() {
        let mut rng = StdRng::seed_from_u64(1);
        let last_free = 654_321;
        let existing: HashSet<AccountNumber> = (AccountNumber::MIN..=AccountNumber::MAX)
            .filter(|v| *v != last_free)
            .filter_map(AccountNumber::new)
            .collect();

        let n = generate_account_number(&existing, &mut rng).unwrap();
        assert_eq!(n.get(), last_free);
    }

    #[test]
    fn test_generator_reports_exhaustion() {
        let mut rng = StdRng::seed_from_u64(1);
        let existing: HashSet<AccountNumber> = (AccountNumber::MIN..=AccountNumber::MAX)
            .filter_map(AccountNumber::new)
            .collect();

        let result = generate_account_number(&existing, &mut rng);
        assert!(matches!(result, Err(Error::AccountSpaceExhausted(900_000))));
    }

    #[test]
    fn test_create_account_validation() {
        let (store, ledger) = ledger();
        let cases = [
            ("", Decimal::ONE, "pw", ValidationError::EmptyName),
            ("   ", Decimal::ONE, "pw", ValidationError::EmptyName),
            ("Smith, Al", Decimal::ONE, "pw", ValidationError::InvalidName),
            ("Al", Decimal::NEGATIVE_ONE, "pw", ValidationError::NegativeDeposit),
            ("Al", Decimal::ONE, "", ValidationError::EmptyPassword),
            ("Al", Decimal::ONE, "   ", ValidationError::EmptyPassword),
        ];

        for (name, deposit, password, expected) in cases {
            match ledger.create_account(name, deposit, password) {
                Err(Error::Validation(e)) => assert_eq!(e, expected),
                other => panic!("expected {expected:?}, got {other:?}"),
            }
        }
        // Nothing was written, not even the header
        assert!(store.contents(ledger.path()).is_none());
    }

    #[test]
    fn test_create_account_appends_record() {
        let (store, ledger) = ledger();
        let n = ledger.create_account(" Alice ", Decimal::new(10000, 2), "pw1").unwrap();

        let lines = store.contents(ledger.path()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], ACCOUNTS_HEADER);
        let account = Account::parse_line(&lines[1]).unwrap();
        assert_eq!(account.account_number, n);
        assert_eq!(account.name, "Alice");
        assert_eq!(account.balance.to_string(), "100.00");
        assert_ne!(account.password_hash, "pw1");
    }

    #[test]
    fn test_zero_deposit_allowed() {
        let (_, ledger) = ledger();
        assert!(ledger.create_account("Zed", Decimal::ZERO, "pw").is_ok());
    }

    #[test]
    fn test_login_matches_number_and_password() {
        let (_, ledger) = ledger();
        let n = ledger.create_account("Alice", Decimal::new(10000, 2), "pw1").unwrap();

        let session = ledger.login(n, "pw1").unwrap().unwrap();
        assert_eq!(session.account_number, n);
        assert_eq!(session.name, "Alice");
        assert_eq!(session.balance, Decimal::new(100, 0));

        assert!(ledger.login(n, "wrong").unwrap().is_none());
        let other = if n.get() == 100_000 { number(100_001) } else { number(100_000) };
        assert!(ledger.login(other, "pw1").unwrap().is_none());
    }

    #[test]
    fn test_login_skips_malformed_lines() {
        let (store, ledger) = ledger();
        let digest = CredentialHasher::sha256().hash("pw").unwrap();
        store
            .insert(
                "accounts.txt",
                vec![
                    ACCOUNTS_HEADER.to_string(),
                    "garbage".to_string(),
                    "111111,Too,Many,Fields,Here,Extra".to_string(),
                    format!("111111,Carol,{digest},25.5,2024-01-15 10:30:00"),
                ],
            )
            .unwrap();

        let session = ledger.login(number(111_111), "pw").unwrap().unwrap();
        assert_eq!(session.name, "Carol");
        assert_eq!(session.balance, Decimal::new(255, 1));
    }

    #[test]
    fn test_login_on_missing_file_is_no_session() {
        let (_, ledger) = ledger();
        assert!(ledger.login(number(123_456), "pw").unwrap().is_none());
    }

    #[test]
    fn test_unreadable_date_still_logs_in_and_updates() {
        let (store, ledger) = ledger();
        let digest = CredentialHasher::sha256().hash("pw").unwrap();
        store
            .insert(
                "accounts.txt",
                vec![
                    ACCOUNTS_HEADER.to_string(),
                    format!("222222,Dana,{digest},40,last tuesday"),
                ],
            )
            .unwrap();

        let session = ledger.login(number(222_222), "pw").unwrap().unwrap();
        assert_eq!(session.balance, Decimal::new(40, 0));

        ledger.update_balance(number(222_222), Decimal::new(55, 0)).unwrap();
        let lines = store.contents(ledger.path()).unwrap();
        assert_eq!(lines[1], format!("222222,Dana,{digest},55,last tuesday"));
    }

    #[test]
    fn test_update_balance_preserves_order_and_other_lines() {
        let (store, ledger) = ledger();
        let original = vec![
            ACCOUNTS_HEADER.to_string(),
            "300000,C,h3,3,2024-01-15 10:30:00".to_string(),
            "not a record".to_string(),
            "100000,A,h1,1,2024-01-15 10:30:00".to_string(),
            "200000,B,h2,2,2024-01-15 10:30:00".to_string(),
        ];
        store.insert("accounts.txt", original.clone()).unwrap();

        ledger.update_balance(number(100_000), Decimal::new(4250, 2)).unwrap();

        let lines = store.contents(ledger.path()).unwrap();
        assert_eq!(lines[0], original[0]);
        assert_eq!(lines[1], original[1]);
        assert_eq!(lines[2], original[2]);
        assert_eq!(lines[3], "100000,A,h1,42.50,2024-01-15 10:30:00");
        assert_eq!(lines[4], original[4]);
    }

    #[test]
    fn test_update_balance_unknown_account_leaves_file() {
        let (store, ledger) = ledger();
        let original = vec![
            ACCOUNTS_HEADER.to_string(),
            "100000,A,h1,1,2024-01-15 10:30:00".to_string(),
        ];
        store.insert("accounts.txt", original.clone()).unwrap();

        let result = ledger.update_balance(number(999_999), Decimal::TEN);
        assert!(matches!(result, Err(Error::AccountNotFound(n)) if n.get() == 999_999));
        assert_eq!(store.contents(ledger.path()).unwrap(), original);
    }

    #[test]
    fn test_update_balance_rejects_negative() {
        let (_, ledger) = ledger();
        let n = ledger.create_account("Alice", Decimal::ONE, "pw").unwrap();
        let result = ledger.update_balance(n, Decimal::NEGATIVE_ONE);
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::NegativeBalance))
        ));
    }

    #[test]
    fn test_create_account_surfaces_write_failure() {
        let (store, ledger) = ledger();
        ledger.ensure_initialized().unwrap();
        store.fail_writes(true);
        assert!(matches!(
            ledger.create_account("Alice", Decimal::ONE, "pw"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_get_and_list_accounts() {
        let (_, ledger) = ledger();
        let a = ledger.create_account("Alice", Decimal::ONE, "pw").unwrap();
        let b = ledger.create_account("Bob", Decimal::TWO, "pw").unwrap();

        let all = ledger.list_accounts().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].account_number, a);
        assert_eq!(all[1].account_number, b);
        assert_eq!(ledger.get_account(b).unwrap().unwrap().name, "Bob");
    }
}
