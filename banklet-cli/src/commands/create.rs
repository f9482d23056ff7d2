//! Create command - open an account from the command line

use std::path::Path;

use anyhow::Result;
use banklet_core::services::parse_amount;
use banklet_core::OperationResult;
use serde_json::json;

use super::{get_context, get_password_with_confirm};
use crate::output;

pub fn run(
    data_dir: &Path,
    name: &str,
    deposit: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let deposit = parse_amount(deposit)?;
    let password = get_password_with_confirm(password)?;

    let result = ctx.ledger.create_account(name, deposit, &password);

    if json {
        let op = OperationResult::from(result)
            .with_context("name", json!(name.trim()))
            .with_context("balance", json!(deposit));
        println!("{}", serde_json::to_string_pretty(&op)?);
        return Ok(());
    }

    let number = result?;
    output::success(&format!(
        "Account created successfully. Your account number is: {}",
        number
    ));
    Ok(())
}
