//! Init command - create the data directory and record files

use std::path::Path;

use anyhow::{Context, Result};
use banklet_core::config::{Config, SETTINGS_FILE};
use banklet_core::PasswordScheme;

use super::get_context;
use crate::output;

pub fn run(data_dir: &Path, password_scheme: Option<&str>) -> Result<()> {
    let mut config = Config::load(data_dir)?;
    if let Some(scheme) = password_scheme {
        config.password_scheme = scheme
            .parse::<PasswordScheme>()
            .map_err(anyhow::Error::msg)?;
    }
    config
        .save(data_dir)
        .with_context(|| format!("Failed to write {}", SETTINGS_FILE))?;

    let ctx = get_context(data_dir)?;

    output::success(&format!("Initialized {}", ctx.data_dir.display()));
    output::info(&format!("  accounts:     {}", ctx.ledger.path().display()));
    output::info(&format!("  transactions: {}", ctx.transaction_log.path().display()));
    output::info(&format!("  passwords:    {}", ctx.config.password_scheme));
    Ok(())
}
