//! Banklet CLI - a small text-file bank in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{create, doctor, init, menu, statement};

/// Banklet - create accounts, deposit, withdraw and print statements
#[derive(Parser)]
#[command(name = "banklet", version, about, long_about = None)]
struct Cli {
    /// Data directory holding settings and record files
    #[arg(long, global = true, env = "BANKLET_DIR")]
    data_dir: Option<PathBuf>,

    /// Log service activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, settings and record files
    Init {
        /// Hash new passwords with this scheme (argon2id, sha256)
        #[arg(long)]
        password_scheme: Option<String>,
    },

    /// Create an account without the interactive menu
    Create {
        /// Account holder name
        #[arg(long)]
        name: String,
        /// Initial deposit
        #[arg(long, default_value = "0")]
        deposit: String,
        /// Account password
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the mini-statement of an account
    Statement {
        /// Account number
        #[arg(long)]
        account: String,
        /// Account password
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the record files for integrity problems
    Doctor {
        /// Show details for failed checks
        #[arg(long)]
        details: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("BANKLET_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = commands::resolve_data_dir(cli.data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");

    match cli.command {
        None => menu::run(&data_dir),
        Some(Commands::Init { password_scheme }) => {
            init::run(&data_dir, password_scheme.as_deref())
        }
        Some(Commands::Create { name, deposit, password, json }) => {
            create::run(&data_dir, &name, &deposit, password, json)
        }
        Some(Commands::Statement { account, password, json }) => {
            statement::run(&data_dir, &account, password, json)
        }
        Some(Commands::Doctor { details, json }) => doctor::run(&data_dir, details, json),
    }
}
