mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::audit::{AuditArgs, AuditRun, MetricsArgs};
use trade_audit_core::AuditError;

/// Trade-log performance audit
#[derive(Parser)]
#[command(
    name = "trade-audit",
    version,
    about = "Audit a trade-execution log into risk/return metrics, a text report and a dashboard",
    long_about = "Reads a trade-execution CSV (Date, Time, Buy/Sell, Trade Value, optional Segment), \
                  derives signed daily cashflows, the equity curve and drawdown, and reports \
                  win rate, profit factor, risk/reward and max drawdown."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "summary", global = true)]
    output: OutputFormat,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full audit and write the text report and dashboard image
    Audit(AuditArgs),
    /// Compute and print the metrics without writing any files
    Metrics(MetricsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Summary,
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result: Result<AuditRun, Box<dyn std::error::Error>> = match cli.command {
        Commands::Audit(args) => commands::audit::run_audit(args),
        Commands::Metrics(args) => commands::audit::run_metrics(args),
        Commands::Version => {
            println!("trade-audit {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(run) => {
            output::format_output(&cli.output, &run);
            process::exit(0);
        }
        Err(e) => match e.downcast_ref::<AuditError>() {
            // Nothing was written; report and leave cleanly.
            Some(audit_err) if audit_err.is_graceful() => {
                eprintln!("{}: {}", "notice".yellow().bold(), audit_err);
                process::exit(0);
            }
            Some(audit_err) => {
                eprintln!("{} [{}]: {}", "error".red().bold(), stage(audit_err), audit_err);
                process::exit(1);
            }
            None => {
                eprintln!("{}: {}", "error".red().bold(), e);
                process::exit(1);
            }
        },
    }
}

/// Pipeline stage an error originated in, for the user-facing label.
fn stage(err: &AuditError) -> &'static str {
    match err {
        AuditError::MissingInput { .. } | AuditError::Csv(_) | AuditError::Io(_) => "load",
        AuditError::MissingColumn(_) | AuditError::MalformedRow { .. } => "parse",
        AuditError::UnknownSide { .. } => "cashflow",
        AuditError::InsufficientData(_) | AuditError::Overflow { .. } => "metrics",
        AuditError::SerializationError(_) => "output",
    }
}
