use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::price::PricePoint;
use super::traits::PriceProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage API provider for stock/equity prices.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (`ALPHAVANTAGE_API_KEY`).
/// - **Coverage**: 100k+ global equity symbols.
///
/// Registered after Yahoo Finance and only used as a fallback.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Point the provider at a different endpoint (tests, proxies).
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            base_url: base_url.to_string(),
        }
    }

    /// Parse the `Time Series (Daily)` map into sorted price points.
    /// Rows with unparseable dates or prices are skipped.
    fn parse_series(series: &HashMap<String, DailyData>) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = series
            .iter()
            .filter_map(|(date_str, data)| {
                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
                let close: Decimal = data.close.trim().parse().ok()?;
                Some(PricePoint { date, close })
            })
            .collect();
        points.sort_by_key(|p| p.date);
        points
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyData>>,
}

#[derive(Deserialize)]
struct DailyData {
    #[serde(rename = "4. close")]
    close: String,
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_recent_closes(&self, symbol: &str) -> Result<Vec<PricePoint>, CoreError> {
        // Compact output = last 100 trading days
        let resp: TimeSeriesResponse = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", &symbol.to_uppercase()),
                ("outputsize", "compact"),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to parse time series for {symbol}: {e}"),
            })?;

        let series = resp.time_series.ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No time series data for {symbol}. API limit may be exceeded."),
        })?;

        Ok(Self::parse_series(&series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_series_sorts_and_skips_bad_rows() {
        let json = r#"{
            "Time Series (Daily)": {
                "2025-01-16": { "4. close": "101.50" },
                "2025-01-15": { "4. close": "100.00" },
                "not-a-date": { "4. close": "1.00" },
                "2025-01-14": { "4. close": "n/a" }
            }
        }"#;
        let resp: TimeSeriesResponse = serde_json::from_str(json).unwrap();
        let points = AlphaVantageProvider::parse_series(&resp.time_series.unwrap());

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(points[1].close, Decimal::new(10150, 2));
    }

    #[test]
    fn missing_series_deserializes_to_none() {
        let json = r#"{ "Note": "Thank you for using Alpha Vantage!" }"#;
        let resp: TimeSeriesResponse = serde_json::from_str(json).unwrap();
        assert!(resp.time_series.is_none());
    }
}
