//! Statement command - log in and print a mini-statement

use std::path::Path;

use anyhow::{bail, Result};
use banklet_core::{AccountNumber, OperationResult, TransactionRecord};
use serde_json::json;

use super::{get_context, get_password_or_prompt};
use crate::output;

pub fn run(data_dir: &Path, account: &str, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let account_number: AccountNumber = account
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid account number: {}", account))?;
    let password = get_password_or_prompt(password, "Password")?;

    let Some(session) = ctx.teller.open_session(account_number, &password)? else {
        if json {
            let op: OperationResult<Vec<TransactionRecord>> =
                OperationResult::fail("Invalid account number or password");
            println!("{}", serde_json::to_string_pretty(&op)?);
            return Ok(());
        }
        bail!("Invalid account number or password");
    };

    let records = ctx.teller.mini_statement(&session)?;

    if json {
        let op = OperationResult::ok(records)
            .with_context("name", json!(session.name))
            .with_context("balance", json!(session.balance));
        println!("{}", serde_json::to_string_pretty(&op)?);
        return Ok(());
    }

    output::info(&format!("{} ({})", session.name, session.account_number));
    output::print_statement(&records);
    println!("Balance: {}", session.balance);
    Ok(())
}
