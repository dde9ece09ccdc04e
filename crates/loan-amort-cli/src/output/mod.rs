pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use clap::ValueEnum;
use serde_json::Value;

/// How a command result is written to stdout.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Full envelope, pretty-printed.
    Json,
    /// Schedule grid followed by the summary, warnings and methodology.
    Table,
    /// One record per period for schedules, `field,value` pairs otherwise.
    Csv,
    /// The monthly payment alone.
    Minimal,
}

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    tracing::debug!(?format, "writing result");
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}
