use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::models::account::{Account, AccountBook};
use crate::models::performance::{AccountResult, PortfolioResult, StockResult};
use crate::models::price::PriceSample;
use crate::providers::traits::PriceLookup;

/// Turns account positions plus fresh price samples into day-over-day
/// gain/loss per stock, per account, and overall.
///
/// Lookups may run concurrently, but results are always assembled in
/// account order and then position order.
pub struct PerformanceService {
    concurrency: usize,
}

impl PerformanceService {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch a sample for every position and compute the portfolio result.
    pub async fn compute(&self, accounts: &AccountBook, lookup: &dyn PriceLookup) -> PortfolioResult {
        let tickers: Vec<&str> = accounts
            .iter()
            .flat_map(|a| a.positions.iter().map(|p| p.ticker.as_str()))
            .collect();

        // `buffered` yields in submission order, so samples line up with `tickers`
        let samples: Vec<PriceSample> = stream::iter(tickers)
            .map(|ticker| lookup.lookup(ticker))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut samples = samples.into_iter();
        let account_results = accounts
            .iter()
            .map(|account| {
                let taken: Vec<PriceSample> = samples.by_ref().take(account.positions.len()).collect();
                Self::compute_account(account, &taken)
            })
            .collect();

        let result = PortfolioResult::from_accounts(account_results);
        info!(total_change = %result.total_change.round_dp(2), "Overall change across all accounts");
        result
    }

    /// Pure aggregation for one account. `samples[i]` belongs to
    /// `account.positions[i]`; a missing sample counts as unavailable.
    pub fn compute_account(account: &Account, samples: &[PriceSample]) -> AccountResult {
        let stocks: Vec<StockResult> = account
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let stock = match samples.get(i) {
                    Some(sample) => StockResult::from_sample(position, sample),
                    None => StockResult::unavailable(position),
                };
                if stock.available {
                    info!(
                        account = %account.id,
                        ticker = %stock.ticker,
                        close = %stock.current_close.round_dp(2),
                        percent = %stock.percent_change.round_dp(2),
                        change = %stock.money_change.round_dp(2),
                        "Stock change"
                    );
                } else {
                    warn!(account = %account.id, ticker = %stock.ticker, "No data for stock");
                }
                stock
            })
            .collect();

        let result = AccountResult::new(&account.id, &account.name, stocks);
        info!(
            account = %account.id,
            total_change = %result.total_change.round_dp(2),
            "Account total change"
        );
        result
    }
}

impl Default for PerformanceService {
    fn default() -> Self {
        Self::new(crate::models::settings::DEFAULT_LOOKUP_CONCURRENCY)
    }
}
