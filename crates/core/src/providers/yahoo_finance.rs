use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::price::PricePoint;
use super::traits::PriceProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Range requested from Yahoo: five sessions covers the last two even across
/// a long weekend.
const HISTORY_RANGE: &str = "5d";

/// Yahoo Finance API provider for stock/equity prices.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's
/// public endpoints. Prices are returned in the stock's native currency.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<chrono::NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_recent_closes(&self, symbol: &str) -> Result<Vec<PricePoint>, CoreError> {
        let resp = self
            .connector
            .get_quote_range(symbol, "1d", HISTORY_RANGE)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch history for {symbol}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        let mut points: Vec<PricePoint> = quotes
            .iter()
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp)?;
                // Yahoo pads holidays with NaN rows
                let close = Decimal::try_from(q.close).ok()?;
                Some(PricePoint { date, close })
            })
            .collect();

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}
