//! Rendering helpers shared by the subcommands.

use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Titled table; empty lists render as `(none)`.
pub fn print_table<T: Tabled>(title: &str, rows: &[T]) {
    println!("{title}");
    match rows {
        [] => println!("  (none)"),
        rows => println!("{}", Table::new(rows)),
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => tracing::error!(error = %err, "Could not encode output as JSON"),
    }
}

pub fn print_warning(msg: &str) {
    println!("! {msg}");
}

/// Plugin names in execution order for a single table cell.
pub fn join(names: &[String]) -> String {
    if names.is_empty() {
        return "-".into();
    }
    names.join(" -> ")
}
