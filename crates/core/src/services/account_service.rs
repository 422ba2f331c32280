use crate::errors::CoreError;
use crate::models::account::{normalize_ticker, Account, AccountBook, Position};

/// Edits the account book: accounts and the positions inside them.
///
/// No I/O here. Callers persist the book afterwards.
pub struct AccountService;

impl AccountService {
    pub fn new() -> Self {
        Self
    }

    /// Add a new, empty account. IDs must be unique and names non-empty.
    pub fn add_account(&self, book: &mut AccountBook, id: &str, name: &str) -> Result<(), CoreError> {
        let account = Account::new(id, name)?;
        book.insert(account)
    }

    /// Remove an account and everything in it. Returns the removed account.
    pub fn remove_account(&self, book: &mut AccountBook, id: &str) -> Result<Account, CoreError> {
        book.remove(id.trim())
    }

    /// Add a stock to an existing account.
    /// Fails if the ticker is already held there (use `update_stock_quantity`).
    pub fn add_stock(
        &self,
        book: &mut AccountBook,
        account_id: &str,
        ticker: &str,
        quantity: u64,
    ) -> Result<(), CoreError> {
        let position = Position::new(ticker, quantity)?;
        Self::account_mut(book, account_id)?.add_position(position)
    }

    /// Remove a stock from an account. Returns the removed position.
    pub fn remove_stock(
        &self,
        book: &mut AccountBook,
        account_id: &str,
        ticker: &str,
    ) -> Result<Position, CoreError> {
        let ticker = normalize_ticker(ticker)?;
        let account = Self::account_mut(book, account_id)?;
        let idx = account
            .positions
            .iter()
            .position(|p| p.ticker == ticker)
            .ok_or_else(|| CoreError::StockNotFound {
                account: account.id.clone(),
                ticker: ticker.clone(),
            })?;
        Ok(account.positions.remove(idx))
    }

    /// Replace the share count of a held stock. Returns the previous count.
    pub fn update_stock_quantity(
        &self,
        book: &mut AccountBook,
        account_id: &str,
        ticker: &str,
        quantity: u64,
    ) -> Result<u64, CoreError> {
        if quantity == 0 {
            return Err(CoreError::ValidationError(
                "Quantity must be greater than 0".into(),
            ));
        }
        let ticker = normalize_ticker(ticker)?;
        let account = Self::account_mut(book, account_id)?;
        let owner = account.id.clone();
        let position = account
            .position_mut(&ticker)
            .ok_or(CoreError::StockNotFound {
                account: owner,
                ticker,
            })?;
        let previous = position.quantity;
        position.quantity = quantity;
        Ok(previous)
    }

    fn account_mut<'a>(book: &'a mut AccountBook, account_id: &str) -> Result<&'a mut Account, CoreError> {
        let id = account_id.trim();
        book.get_mut(id)
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))
    }
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}
