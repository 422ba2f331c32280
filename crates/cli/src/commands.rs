use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, warn};

use stock_report_core::models::account::AccountBook;
use stock_report_core::models::settings::Settings;
use stock_report_core::services::account_service::AccountService;
use stock_report_core::storage::manager::{AccountStore, JsonFileStore};
use stock_report_core::{DeliveryMode, DeliveryOutcome, ReportAssembler, SummaryOutcome};

use crate::{AccountCommands, StockCommands};

pub async fn run_report(
    settings: &Settings,
    date: NaiveDate,
    send: bool,
    with_summary: bool,
    html_out: Option<PathBuf>,
) -> Result<()> {
    let store = JsonFileStore::new(&settings.accounts_file);
    let accounts = store
        .load()
        .with_context(|| format!("Failed to load accounts from {}", store.path().display()))?;
    if accounts.is_empty() {
        warn!("No accounts configured, the report will be empty");
    }

    let mut assembler = ReportAssembler::from_settings(settings);
    if !with_summary {
        assembler = assembler.without_summary();
    }

    let mode = if send {
        DeliveryMode::Send
    } else {
        DeliveryMode::Skip
    };
    let outcome = assembler.run(&accounts, date, mode).await;

    println!("{}", assembler.render_text(&outcome.result, date));

    match &outcome.summary {
        SummaryOutcome::Generated(text) => {
            println!("--- AI Generated Portfolio Analysis ---\n{text}\n-------------------");
        }
        SummaryOutcome::Failed(text) => println!("{text}"),
        SummaryOutcome::Skipped => {}
    }

    if let Some(path) = html_out {
        std::fs::write(&path, outcome.document.as_str())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "HTML report written");
    }

    match &outcome.delivery {
        DeliveryOutcome::Delivered => println!("Email sent successfully: {}", outcome.subject),
        DeliveryOutcome::Skipped => println!("Email not sent (--no-send)"),
        DeliveryOutcome::Failed(reason) => println!("Error sending email: {reason}"),
    }

    println!("\nDone.");
    Ok(())
}

pub fn run_accounts(settings: &Settings, command: AccountCommands) -> Result<()> {
    let store = JsonFileStore::new(&settings.accounts_file);
    let mut book = load(&store)?;
    let service = AccountService::new();

    match command {
        AccountCommands::List => {
            print_accounts(&book);
            return Ok(());
        }
        AccountCommands::Add { id, name } => {
            service.add_account(&mut book, &id, &name)?;
            store.save(&book)?;
            println!("Account '{}' ({}) added", name.trim(), id.trim());
        }
        AccountCommands::Remove { id } => {
            let removed = service.remove_account(&mut book, &id)?;
            store.save(&book)?;
            println!("Account '{}' ({}) removed", removed.name, removed.id);
        }
    }
    Ok(())
}

pub fn run_stocks(settings: &Settings, command: StockCommands) -> Result<()> {
    let store = JsonFileStore::new(&settings.accounts_file);
    let mut book = load(&store)?;
    let service = AccountService::new();

    match command {
        StockCommands::Add {
            account,
            ticker,
            quantity,
        } => {
            service.add_stock(&mut book, &account, &ticker, quantity)?;
            store.save(&book)?;
            println!(
                "Added {quantity} shares of {} to {}",
                ticker.trim().to_uppercase(),
                account_name(&book, &account)
            );
        }
        StockCommands::Remove { account, ticker } => {
            let removed = service.remove_stock(&mut book, &account, &ticker)?;
            store.save(&book)?;
            println!(
                "Removed {} ({} shares) from {}",
                removed.ticker,
                removed.quantity,
                account_name(&book, &account)
            );
        }
        StockCommands::Update {
            account,
            ticker,
            quantity,
        } => {
            let previous = service.update_stock_quantity(&mut book, &account, &ticker, quantity)?;
            store.save(&book)?;
            println!(
                "Updated {} from {previous} to {quantity} shares in {}",
                ticker.trim().to_uppercase(),
                account_name(&book, &account)
            );
        }
    }
    Ok(())
}

fn load(store: &JsonFileStore) -> Result<AccountBook> {
    store
        .load()
        .with_context(|| format!("Failed to load accounts from {}", store.path().display()))
}

fn account_name(book: &AccountBook, id: &str) -> String {
    book.get(id.trim())
        .map(|a| a.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn print_accounts(book: &AccountBook) {
    if book.is_empty() {
        println!("No accounts found.");
        return;
    }

    let rule = "=".repeat(60);
    println!("{rule}\nALL INVESTMENT ACCOUNTS\n{rule}");
    for account in book.iter() {
        println!("\nAccount ID: {}", account.id);
        println!("Name: {}", account.name);
        println!("Stocks:");
        if account.positions.is_empty() {
            println!("  (No stocks)");
        }
        for position in &account.positions {
            println!("  - {}: {} shares", position.ticker, position.quantity);
        }
    }
    println!("{rule}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_in(dir: &tempfile::TempDir) -> Settings {
        let mut settings = Settings::from_vars(|_| None).unwrap();
        settings.accounts_file = dir.path().join("investment_accounts.json");
        settings
    }

    #[test]
    fn account_and_stock_edits_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(&dir);

        run_accounts(
            &settings,
            AccountCommands::Add {
                id: "ac1".into(),
                name: "Roth IRA".into(),
            },
        )
        .unwrap();
        run_stocks(
            &settings,
            StockCommands::Add {
                account: "ac1".into(),
                ticker: "aapl".into(),
                quantity: 10,
            },
        )
        .unwrap();
        run_stocks(
            &settings,
            StockCommands::Update {
                account: "ac1".into(),
                ticker: "AAPL".into(),
                quantity: 12,
            },
        )
        .unwrap();

        let book = JsonFileStore::new(&settings.accounts_file).load().unwrap();
        let account = book.get("ac1").unwrap();
        assert_eq!(account.name, "Roth IRA");
        assert_eq!(account.position("AAPL").unwrap().quantity, 12);
    }

    #[test]
    fn failed_edit_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(&dir);

        let result = run_stocks(
            &settings,
            StockCommands::Add {
                account: "missing".into(),
                ticker: "AAPL".into(),
                quantity: 1,
            },
        );
        assert!(result.is_err());
        assert!(!settings.accounts_file.exists());
    }

    #[test]
    fn removing_account_drops_its_stocks() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(&dir);
        std::fs::write(
            &settings.accounts_file,
            r#"{"accounts": {"ac1": {"name": "A", "stocks": [{"ticker": "VOO", "no_of_stocks": 3}]}}}"#,
        )
        .unwrap();

        run_accounts(&settings, AccountCommands::Remove { id: "ac1".into() }).unwrap();

        let book = JsonFileStore::new(&settings.accounts_file).load().unwrap();
        assert!(book.is_empty());
    }
}
