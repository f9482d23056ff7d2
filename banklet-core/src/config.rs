//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "storage": { "accountsFile": "accounts.txt", "transactionsFile": "transactions.txt" },
//!   "security": { "passwordScheme": "argon2id", "argon2": { "timeCost": 3, ... } }
//! }
//! ```
//! Unknown keys are preserved when the file is saved.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{Argon2Params, PasswordScheme};

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_ACCOUNTS_FILE: &str = "accounts.txt";
pub const DEFAULT_TRANSACTIONS_FILE: &str = "transactions.txt";

/// Environment override for the password scheme
pub const PASSWORD_SCHEME_ENV: &str = "BANKLET_PASSWORD_SCHEME";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    storage: StorageSettings,
    #[serde(default)]
    security: SecuritySettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageSettings {
    #[serde(default = "default_accounts_file")]
    accounts_file: String,
    #[serde(default = "default_transactions_file")]
    transactions_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            accounts_file: default_accounts_file(),
            transactions_file: default_transactions_file(),
        }
    }
}

fn default_accounts_file() -> String {
    DEFAULT_ACCOUNTS_FILE.to_string()
}

fn default_transactions_file() -> String {
    DEFAULT_TRANSACTIONS_FILE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecuritySettings {
    #[serde(default)]
    password_scheme: PasswordScheme,
    #[serde(default)]
    argon2: Argon2Params,
}

/// Banklet configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub accounts_file: String,
    pub transactions_file: String,
    pub password_scheme: PasswordScheme,
    pub argon2: Argon2Params,
}

impl Default for Config {
    fn default() -> Self {
        let security = SecuritySettings::default();
        Self {
            accounts_file: default_accounts_file(),
            transactions_file: default_transactions_file(),
            password_scheme: security.password_scheme,
            argon2: security.argon2,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing settings file gives the defaults. The password scheme can be
    /// overridden with `BANKLET_PASSWORD_SCHEME`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = Self::read_settings(data_dir)?;

        let password_scheme = match std::env::var(PASSWORD_SCHEME_ENV).ok() {
            Some(value) => value.parse().map_err(Error::Config)?,
            None => raw.security.password_scheme,
        };

        let config = Self {
            accounts_file: raw.storage.accounts_file,
            transactions_file: raw.storage.transactions_file,
            password_scheme,
            argon2: raw.security.argon2,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to the data directory, preserving keys it doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = Self::read_settings(data_dir)?;

        settings.storage.accounts_file = self.accounts_file.clone();
        settings.storage.transactions_file = self.transactions_file.clone();
        settings.security.password_scheme = self.password_scheme;
        settings.security.argon2 = self.argon2.clone();

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    pub fn accounts_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.accounts_file)
    }

    pub fn transactions_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.transactions_file)
    }

    fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
        let settings_path = data_dir.join(SETTINGS_FILE);
        if !settings_path.exists() {
            return Ok(SettingsFile::default());
        }
        let content = std::fs::read_to_string(&settings_path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("{}: {}", settings_path.display(), e))
        })
    }

    fn validate(&self) -> Result<()> {
        for name in [&self.accounts_file, &self.transactions_file] {
            if name.trim().is_empty() {
                return Err(Error::Config("record file names cannot be empty".to_string()));
            }
        }
        if self.accounts_file == self.transactions_file {
            return Err(Error::Config(
                "accounts and transactions must use different files".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.accounts_file, "accounts.txt");
        assert_eq!(config.transactions_file, "transactions.txt");
        assert_eq!(config.accounts_path(dir.path()), dir.path().join("accounts.txt"));
    }

    #[test]
    fn test_load_camel_case_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{
                "storage": { "accountsFile": "acc.csv" },
                "security": {
                    "passwordScheme": "sha256",
                    "argon2": { "timeCost": 1, "memoryCost": 256, "parallelism": 1, "hashLen": 16 }
                }
            }"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.accounts_file, "acc.csv");
        assert_eq!(config.transactions_file, "transactions.txt");
        assert_eq!(config.argon2.memory_cost, 256);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "theme": "dark", "storage": { "accountsFile": "a.txt" } }"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.transactions_file = "t.txt".to_string();
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["storage"]["accountsFile"], "a.txt");
        assert_eq!(value["storage"]["transactionsFile"], "t.txt");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "storage": { "accountsFile": "same.txt", "transactionsFile": "same.txt" } }"#,
        )
        .unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));

        std::fs::write(dir.path().join(SETTINGS_FILE), "not json").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
    }
}
