//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

use banklet_core::domain::record::format_timestamp;
use banklet_core::TransactionRecord;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print a mini-statement, oldest first
pub fn print_statement(records: &[TransactionRecord]) {
    if records.is_empty() {
        info("No transactions found for your account.");
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Date", "Transaction Type", "Amount", "New Balance"]);
    for record in records {
        table.add_row(vec![
            format_timestamp(&record.timestamp),
            record.transaction_type.to_string(),
            record.amount.to_string(),
            record.resulting_balance.to_string(),
        ]);
    }

    println!("{}", "Mini-Statement".bold());
    println!("{}", table);
}
