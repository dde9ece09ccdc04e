mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use commands::loan::{PaymentArgs, ScheduleArgs};
use output::OutputFormat;

/// Loan amortization schedules with decimal precision
#[derive(Parser)]
#[command(
    name = "amort",
    version,
    about = "Loan amortization schedules with decimal precision",
    long_about = "Builds period-by-period amortization schedules for fixed-rate loans, \
                  with recurring insurance and fees, an optional fixed monthly payment, \
                  and extra principal payments by period."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full amortization schedule with summary and warnings
    Schedule(ScheduleArgs),
    /// Calculate the level monthly payment only
    Payment(PaymentArgs),
    /// Print version information
    Version,
}

/// Logs go to stderr; `RUST_LOG` filters, `AMORT_LOG_FORMAT=json` switches
/// to structured output.
fn init_tracing() {
    let log_format = std::env::var("AMORT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Version => {
            println!("amort {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
