use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Normalize a ticker symbol: trimmed and uppercased (e.g., " aapl " → "AAPL").
/// Empty symbols are rejected.
pub fn normalize_ticker(raw: &str) -> Result<String, CoreError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(CoreError::ValidationError(
            "Ticker symbol cannot be empty".into(),
        ));
    }
    Ok(ticker)
}

/// A single holding inside an account: how many shares of which ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Ticker symbol, uppercased (e.g., "AAPL", "VOO")
    pub ticker: String,

    /// Number of shares held. Always > 0.
    pub quantity: u64,
}

impl Position {
    pub fn new(ticker: &str, quantity: u64) -> Result<Self, CoreError> {
        if quantity == 0 {
            return Err(CoreError::ValidationError(
                "Quantity must be greater than 0".into(),
            ));
        }
        Ok(Self {
            ticker: normalize_ticker(ticker)?,
            quantity,
        })
    }
}

/// A user-defined investment account (e.g., "Roth IRA") and its positions.
///
/// Positions keep the order in which they were added; the report lists
/// them in that same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier (e.g., "ac1")
    pub id: String,

    /// Display name (e.g., "Traditional IRA")
    pub name: String,

    pub positions: Vec<Position>,
}

impl Account {
    pub fn new(id: &str, name: &str) -> Result<Self, CoreError> {
        let id = id.trim();
        let name = name.trim();
        if id.is_empty() {
            return Err(CoreError::ValidationError(
                "Account ID cannot be empty".into(),
            ));
        }
        if name.is_empty() {
            return Err(CoreError::ValidationError(
                "Account name cannot be empty".into(),
            ));
        }
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            positions: Vec::new(),
        })
    }

    /// Find a position by ticker (case-insensitive).
    pub fn position(&self, ticker: &str) -> Option<&Position> {
        let upper = ticker.trim().to_uppercase();
        self.positions.iter().find(|p| p.ticker == upper)
    }

    pub fn position_mut(&mut self, ticker: &str) -> Option<&mut Position> {
        let upper = ticker.trim().to_uppercase();
        self.positions.iter_mut().find(|p| p.ticker == upper)
    }

    /// Append a position. Tickers must be unique within an account.
    pub fn add_position(&mut self, position: Position) -> Result<(), CoreError> {
        if let Some(existing) = self.position(&position.ticker) {
            return Err(CoreError::ValidationError(format!(
                "Stock '{}' already exists in account '{}' ({} shares); update its quantity instead",
                existing.ticker, self.id, existing.quantity
            )));
        }
        self.positions.push(position);
        Ok(())
    }
}

/// All accounts, in the order of the persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBook {
    accounts: Vec<Account>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from an ordered list, rejecting duplicate account IDs.
    pub fn from_accounts(accounts: Vec<Account>) -> Result<Self, CoreError> {
        let mut book = Self::new();
        for account in accounts {
            book.insert(account)?;
        }
        Ok(book)
    }

    pub fn insert(&mut self, account: Account) -> Result<(), CoreError> {
        if self.contains(&account.id) {
            return Err(CoreError::ValidationError(format!(
                "Account '{}' already exists",
                account.id
            )));
        }
        self.accounts.push(account);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Account, CoreError> {
        let idx = self
            .accounts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))?;
        Ok(self.accounts.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Total number of positions across every account.
    pub fn position_count(&self) -> usize {
        self.accounts.iter().map(|a| a.positions.len()).sum()
    }
}
