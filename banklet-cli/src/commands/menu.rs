//! Interactive menu - the default when no subcommand is given

use std::path::Path;

use anyhow::{bail, Result};
use banklet_core::services::parse_amount;
use banklet_core::{AccountNumber, BankContext, Error, Session};
use dialoguer::{Input, Password, Select};

use super::get_context;
use crate::output;

const MAIN_MENU: &[&str] = &["Create Account", "Login", "Exit"];
const SESSION_MENU: &[&str] = &[
    "Check Balance",
    "Deposit",
    "Withdraw",
    "Mini-Statement",
    "Logout",
];

pub fn run(data_dir: &Path) -> Result<()> {
    if !atty::is(atty::Stream::Stdin) {
        bail!("The interactive menu needs a terminal. Use a subcommand, see --help");
    }

    let ctx = get_context(data_dir)?;

    loop {
        println!();
        let choice = Select::new()
            .with_prompt("Banking System")
            .items(MAIN_MENU)
            .default(0)
            .interact()?;

        let outcome = match choice {
            0 => create_account(&ctx),
            1 => login(&ctx),
            _ => {
                output::info("Thank you for using the banking system.");
                return Ok(());
            }
        };

        if let Err(e) = outcome {
            report(&e);
        }
    }
}

/// Rejected input is a warning, anything else an error
fn report(e: &anyhow::Error) {
    match e.downcast_ref::<Error>() {
        Some(err) if err.is_validation() => output::warning(&format!("{}", err)),
        _ => output::error(&format!("Error: {:#}", e)),
    }
}

fn create_account(ctx: &BankContext) -> Result<()> {
    let name: String = Input::new()
        .with_prompt("Enter your name")
        .allow_empty(true)
        .interact_text()?;
    let deposit: String = Input::new()
        .with_prompt("Enter your initial deposit")
        .interact_text()?;
    let deposit = parse_amount(&deposit)?;
    let password = Password::new()
        .with_prompt("Enter a password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .allow_empty_password(true)
        .interact()?;

    let number = ctx.ledger.create_account(&name, deposit, &password)?;
    output::success(&format!(
        "Account created successfully. Your account number is: {}",
        number
    ));
    Ok(())
}

fn login(ctx: &BankContext) -> Result<()> {
    let account: String = Input::new()
        .with_prompt("Enter your account number")
        .interact_text()?;
    let Ok(account_number) = account.parse::<AccountNumber>() else {
        output::warning("Invalid account number or password.");
        return Ok(());
    };
    let password = Password::new()
        .with_prompt("Enter your password")
        .allow_empty_password(true)
        .interact()?;

    match ctx.teller.open_session(account_number, &password)? {
        Some(session) => {
            output::success(&format!("Welcome, {}!", session.name));
            session_menu(ctx, session)
        }
        None => {
            output::warning("Invalid account number or password.");
            Ok(())
        }
    }
}

fn session_menu(ctx: &BankContext, session: Session) -> Result<()> {
    run_session(ctx, session, |session| {
        println!();
        let choice = Select::new()
            .with_prompt(format!("Account {}", session.account_number))
            .items(SESSION_MENU)
            .default(0)
            .interact()?;
        Ok(choice)
    })
}

/// Drive a session until logout, syncing the balance if the prompt fails
fn run_session(
    ctx: &BankContext,
    mut session: Session,
    mut choose: impl FnMut(&Session) -> Result<usize>,
) -> Result<()> {
    loop {
        let choice = match choose(&session) {
            Ok(choice) => choice,
            Err(e) => {
                if let Err(close) = ctx.teller.close_session(session) {
                    report(&anyhow::Error::new(close).context("Balance not saved"));
                }
                return Err(e);
            }
        };

        let outcome = match choice {
            0 => {
                println!("Your current balance is: {}", ctx.teller.balance(&session));
                Ok(())
            }
            1 => deposit(ctx, &mut session),
            2 => withdraw(ctx, &mut session),
            3 => ctx
                .teller
                .mini_statement(&session)
                .map(|records| output::print_statement(&records))
                .map_err(Into::into),
            _ => match ctx.teller.close_session(session.clone()) {
                Ok(()) => {
                    output::info("Logged out.");
                    return Ok(());
                }
                Err(e) => Err(anyhow::Error::new(e).context("Balance not saved, still logged in")),
            },
        };

        if let Err(e) = outcome {
            report(&e);
        }
    }
}

fn deposit(ctx: &BankContext, session: &mut Session) -> Result<()> {
    let amount: String = Input::new()
        .with_prompt("Enter amount to deposit")
        .interact_text()?;
    let amount = parse_amount(&amount)?;

    ctx.teller.deposit(session, amount)?;
    output::success(&format!(
        "Deposit successful. New balance: {}",
        session.balance
    ));
    Ok(())
}

fn withdraw(ctx: &BankContext, session: &mut Session) -> Result<()> {
    let amount: String = Input::new()
        .with_prompt("Enter amount to withdraw")
        .interact_text()?;
    let amount = parse_amount(&amount)?;

    ctx.teller.withdraw(session, amount)?;
    output::success(&format!(
        "Withdrawal successful. New balance: {}",
        session.balance
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use anyhow::anyhow;
    use banklet_core::adapters::MemoryStore;
    use banklet_core::config::Config;
    use banklet_core::PasswordScheme;
    use rust_decimal::Decimal;

    fn context() -> BankContext {
        let config = Config {
            password_scheme: PasswordScheme::Sha256,
            ..Config::default()
        };
        let ctx = BankContext::with_store(Path::new("bank"), config, Arc::new(MemoryStore::new()));
        ctx.ensure_initialized().unwrap();
        ctx
    }

    fn logged_in(ctx: &BankContext) -> Session {
        let n = ctx.ledger.create_account("Alice", Decimal::new(100, 0), "pw").unwrap();
        let mut session = ctx.teller.open_session(n, "pw").unwrap().unwrap();
        ctx.teller.deposit(&mut session, Decimal::new(25, 0)).unwrap();
        session
    }

    fn stored_balance(ctx: &BankContext, session: &Session) -> Decimal {
        ctx.ledger
            .get_account(session.account_number)
            .unwrap()
            .unwrap()
            .balance
    }

    #[test]
    fn test_failed_prompt_still_syncs_balance() {
        let ctx = context();
        let session = logged_in(&ctx);
        let snapshot = session.clone();

        let result = run_session(&ctx, session, |_| Err(anyhow!("prompt interrupted")));

        assert!(result.is_err());
        assert_eq!(stored_balance(&ctx, &snapshot), Decimal::new(125, 0));
    }

    #[test]
    fn test_logout_syncs_balance() {
        let ctx = context();
        let session = logged_in(&ctx);
        let snapshot = session.clone();

        run_session(&ctx, session, |_| Ok(SESSION_MENU.len() - 1)).unwrap();

        assert_eq!(stored_balance(&ctx, &snapshot), Decimal::new(125, 0));
    }
}
