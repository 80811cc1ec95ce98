mod commands;
mod config;
mod input;
mod output;
mod store;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;

use commands::afford::{AffordArgs, ClassifyArgs};
use commands::compare::CompareArgs;
use commands::history::HistoryArgs;
use commands::loan::{CalculateArgs, ScheduleArgs};
use config::CliConfig;

/// Fixed-rate loan payments, amortization schedules and loan comparison
#[derive(Parser)]
#[command(
    name = "loan",
    version,
    about = "Fixed-rate loan payments, amortization schedules and loan comparison",
    long_about = "A CLI for deterministic fixed-rate loan math: monthly payments and \
                  totals, full amortization schedules, ranked comparison of up to four \
                  loan offers, and debt-to-income affordability checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter (overrides LOAN_LOG; RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the monthly payment and totals for a loan
    Calculate(CalculateArgs),
    /// Generate the full amortization schedule
    Schedule(ScheduleArgs),
    /// Compare loan offers by total payment
    Compare(CompareArgs),
    /// Assess a loan against monthly income and expenses
    Afford(AffordArgs),
    /// Rate a debt-to-income ratio
    Classify(ClassifyArgs),
    /// List or delete saved calculations
    History(HistoryArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(e) = telemetry::init(log_level) {
        fail(&e);
    }
    debug!(?config, "configuration loaded");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::loan::run_calculate(args, &config),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Compare(args) => commands::compare::run_compare(args, &config),
        Commands::Afford(args) => commands::afford::run_afford(args),
        Commands::Classify(args) => commands::afford::run_classify(args),
        Commands::History(args) => commands::history::run_history(args, &config),
        Commands::Version => {
            println!("loan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e.as_ref()),
    }
}

fn fail(e: &dyn std::error::Error) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}
