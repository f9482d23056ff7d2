//! CLI command implementations

pub mod create;
pub mod doctor;
pub mod init;
pub mod menu;
pub mod statement;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use banklet_core::BankContext;
use dialoguer::Password;

/// Environment variable consulted before prompting for a password
pub const PASSWORD_ENV: &str = "BANKLET_PASSWORD";

/// Data directory from the flag / BANKLET_DIR, or ~/.banklet
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".banklet"))
        .context("Could not find home directory, pass --data-dir")
}

/// Open the bank context, creating the record files if needed
pub fn get_context(data_dir: &Path) -> Result<BankContext> {
    BankContext::new(data_dir)
        .with_context(|| format!("Failed to open data directory: {}", data_dir.display()))
}

/// Open the bank context without creating anything on disk
pub fn get_existing_context(data_dir: &Path) -> Result<BankContext> {
    BankContext::open(data_dir)
        .with_context(|| format!("Failed to read data directory: {}", data_dir.display()))
}

/// Get password from the flag, BANKLET_PASSWORD, or a hidden prompt
pub fn get_password_or_prompt(password_flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    if let Ok(p) = env::var(PASSWORD_ENV) {
        return Ok(p);
    }

    let p = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?;
    Ok(p)
}

/// Like `get_password_or_prompt`, but a prompt asks twice
pub fn get_password_with_confirm(password_flag: Option<String>) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }

    if let Ok(p) = env::var(PASSWORD_ENV) {
        return Ok(p);
    }

    let p = Password::new()
        .with_prompt("Enter a password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .allow_empty_password(true)
        .interact()?;
    Ok(p)
}
