use rust_decimal::Decimal;
use serde::Serialize;

use super::account::Position;
use super::price::PriceSample;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Day-over-day result for a single position.
///
/// When `available` is false every numeric field is zero and the row is
/// excluded from all totals, but it still appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockResult {
    pub ticker: String,
    pub quantity: u64,
    pub previous_close: Decimal,
    pub current_close: Decimal,

    /// current_close - previous_close
    pub delta: Decimal,

    /// delta / previous_close × 100
    pub percent_change: Decimal,

    /// delta × quantity, in currency units
    pub money_change: Decimal,

    pub available: bool,
}

impl StockResult {
    /// A "no data" row: ticker and quantity only.
    pub fn unavailable(position: &Position) -> Self {
        Self {
            ticker: position.ticker.clone(),
            quantity: position.quantity,
            previous_close: Decimal::ZERO,
            current_close: Decimal::ZERO,
            delta: Decimal::ZERO,
            percent_change: Decimal::ZERO,
            money_change: Decimal::ZERO,
            available: false,
        }
    }

    /// Derive the result for `position` from its price sample.
    ///
    /// A non-positive previous close has no defined percent change, so it is
    /// reported as unavailable. So is any value that would not fit in a
    /// `Decimal`.
    pub fn from_sample(position: &Position, sample: &PriceSample) -> Self {
        if !sample.available || sample.previous_close <= Decimal::ZERO {
            return Self::unavailable(position);
        }

        let Some((delta, percent_change, money_change)) =
            Self::changes(sample.previous_close, sample.current_close, position.quantity)
        else {
            return Self::unavailable(position);
        };

        Self {
            ticker: position.ticker.clone(),
            quantity: position.quantity,
            previous_close: sample.previous_close,
            current_close: sample.current_close,
            delta,
            percent_change,
            money_change,
            available: true,
        }
    }

    /// (delta, percent, money change), or `None` on overflow.
    fn changes(previous: Decimal, current: Decimal, quantity: u64) -> Option<(Decimal, Decimal, Decimal)> {
        let delta = current.checked_sub(previous)?;
        let percent = delta.checked_div(previous)?.checked_mul(ONE_HUNDRED)?;
        let money = delta.checked_mul(Decimal::from(quantity))?;
        Some((delta, percent, money))
    }
}

/// Sum that clamps at the `Decimal` bounds instead of panicking.
fn total(changes: impl Iterator<Item = Decimal>) -> Decimal {
    changes.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Results for one account, stocks in position order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountResult {
    pub account_id: String,
    pub name: String,
    pub stocks: Vec<StockResult>,

    /// Sum of money_change over available stocks
    pub total_change: Decimal,
}

impl AccountResult {
    pub fn new(account_id: impl Into<String>, name: impl Into<String>, stocks: Vec<StockResult>) -> Self {
        let total_change = total(stocks.iter().filter(|s| s.available).map(|s| s.money_change));
        Self {
            account_id: account_id.into(),
            name: name.into(),
            stocks,
            total_change,
        }
    }

    pub fn available_count(&self) -> usize {
        self.stocks.iter().filter(|s| s.available).count()
    }
}

/// Results for every account, in account iteration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioResult {
    pub accounts: Vec<AccountResult>,

    /// Sum of all account totals
    pub total_change: Decimal,
}

impl PortfolioResult {
    pub fn from_accounts(accounts: Vec<AccountResult>) -> Self {
        let total_change = total(accounts.iter().map(|a| a.total_change));
        Self {
            accounts,
            total_change,
        }
    }

    /// Look up an account's result by its ID.
    #[must_use]
    pub fn account(&self, account_id: &str) -> Option<&AccountResult> {
        self.accounts.iter().find(|a| a.account_id == account_id)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
