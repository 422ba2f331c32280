mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stock_report_core::models::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "stock-report", version, about = "Daily gain/loss report across investment accounts")]
struct Args {
    /// Account document to read and edit
    #[arg(long, env = "ACCOUNTS_FILE", global = true)]
    accounts_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute today's report, print it and email it
    Report {
        /// Do not email the report
        #[arg(long)]
        no_send: bool,
        /// Skip the AI analysis section
        #[arg(long)]
        no_summary: bool,
        /// Also write the HTML report to this file
        #[arg(long)]
        html_out: Option<PathBuf>,
        /// Report date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Manage the stocks held in an account
    Stocks {
        #[command(subcommand)]
        command: StockCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountCommands {
    /// Show every account and its stocks
    List,
    /// Add a new, empty account
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Remove an account and all its stocks
    Remove {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum StockCommands {
    /// Add a stock to an account
    Add {
        #[arg(long)]
        account: String,
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        quantity: u64,
    },
    /// Remove a stock from an account
    Remove {
        #[arg(long)]
        account: String,
        #[arg(long)]
        ticker: String,
    },
    /// Change the number of shares held
    Update {
        #[arg(long)]
        account: String,
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        quantity: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("{}=info,stock_report_core=info", env!("CARGO_CRATE_NAME")).into()
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut settings = Settings::from_env()?;
    if let Some(path) = args.accounts_file {
        settings.accounts_file = path;
    }

    match args.command {
        Commands::Report {
            no_send,
            no_summary,
            html_out,
            date,
        } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            commands::run_report(&settings, date, !no_send, !no_summary, html_out).await
        }
        Commands::Accounts { command } => commands::run_accounts(&settings, command),
        Commands::Stocks { command } => commands::run_stocks(&settings, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_stock_update() {
        let args = Args::parse_from([
            "stock-report",
            "stocks",
            "update",
            "--account",
            "ac1",
            "--ticker",
            "aapl",
            "--quantity",
            "12",
        ]);
        match args.command {
            Commands::Stocks {
                command: StockCommands::Update { account, ticker, quantity },
            } => {
                assert_eq!(account, "ac1");
                assert_eq!(ticker, "aapl");
                assert_eq!(quantity, 12);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_report_flags() {
        let args = Args::parse_from([
            "stock-report",
            "--accounts-file",
            "accounts.json",
            "report",
            "--no-send",
            "--date",
            "2025-01-16",
        ]);
        assert_eq!(args.accounts_file, Some(PathBuf::from("accounts.json")));
        match args.command {
            Commands::Report { no_send, no_summary, date, .. } => {
                assert!(no_send);
                assert!(!no_summary);
                assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2025, 1, 16));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn accounts_file_falls_back_to_environment() {
        let command = Args::command();
        let arg = command
            .get_arguments()
            .find(|a| a.get_id() == "accounts_file")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("ACCOUNTS_FILE")));
        assert!(arg.is_global_set());
    }

    #[test]
    fn zero_quantity_is_accepted_by_parser_and_rejected_later() {
        // Quantity rules live in the account service, not in clap
        let args = Args::try_parse_from([
            "stock-report", "stocks", "add", "--account", "ac1", "--ticker", "X", "--quantity", "0",
        ]);
        assert!(args.is_ok());
    }

    #[test]
    fn negative_quantity_is_rejected_by_parser() {
        let args = Args::try_parse_from([
            "stock-report", "stocks", "add", "--account", "ac1", "--ticker", "X", "--quantity", "-3",
        ]);
        assert!(args.is_err());
    }
}
