use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;
use crate::models::account::{Account, AccountBook, Position};

/// On-disk shape of the account document:
///
/// ```json
/// {
///   "accounts": {
///     "ac1": {
///       "name": "Roth IRA",
///       "stocks": [ { "ticker": "AAPL", "no_of_stocks": 10 } ]
///     }
///   }
/// }
/// ```
///
/// `accounts` is kept as an ordered JSON map so the document order survives
/// a load/save cycle and drives report order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsDocument {
    #[serde(default)]
    accounts: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccountRecord {
    name: String,
    #[serde(default)]
    stocks: Vec<StockRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StockRecord {
    ticker: String,
    /// Signed on read so that negative counts produce a clear error
    no_of_stocks: i64,
}

/// Parse and validate an account document.
///
/// Every record is checked here, at the load boundary: non-empty names,
/// positive integer quantities, tickers unique per account. The first bad
/// record rejects the whole document.
pub fn read_document(data: &[u8]) -> Result<AccountBook, CoreError> {
    let document: AccountsDocument = serde_json::from_slice(data)
        .map_err(|e| CoreError::InvalidAccountData(format!("Malformed account document: {e}")))?;

    let mut book = AccountBook::new();
    for (id, value) in document.accounts {
        let record: AccountRecord = serde_json::from_value(value)
            .map_err(|e| CoreError::InvalidAccountData(format!("Account '{id}': {e}")))?;
        book.insert(record_to_account(&id, record)?)?;
    }
    Ok(book)
}

fn record_to_account(id: &str, record: AccountRecord) -> Result<Account, CoreError> {
    let invalid = |e: CoreError| CoreError::InvalidAccountData(format!("Account '{id}': {e}"));

    let mut account = Account::new(id, &record.name).map_err(invalid)?;
    for stock in record.stocks {
        let quantity = u64::try_from(stock.no_of_stocks).unwrap_or(0);
        let position = Position::new(&stock.ticker, quantity).map_err(|e| {
            CoreError::InvalidAccountData(format!(
                "Account '{id}', stock '{}' ({} shares): {e}",
                stock.ticker, stock.no_of_stocks
            ))
        })?;
        account.add_position(position).map_err(invalid)?;
    }
    Ok(account)
}

/// Serialize the book back to the document shape, pretty-printed.
pub fn write_document(book: &AccountBook) -> Result<Vec<u8>, CoreError> {
    let mut accounts = Map::new();
    for account in book.iter() {
        let record = AccountRecord {
            name: account.name.clone(),
            stocks: account
                .positions
                .iter()
                .map(|p| StockRecord {
                    ticker: p.ticker.clone(),
                    no_of_stocks: i64::try_from(p.quantity).unwrap_or(i64::MAX),
                })
                .collect(),
        };
        let value = serde_json::to_value(record)
            .map_err(|e| CoreError::Serialization(format!("Account '{}': {e}", account.id)))?;
        accounts.insert(account.id.clone(), value);
    }

    serde_json::to_vec_pretty(&AccountsDocument { accounts })
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize accounts: {e}")))
}
