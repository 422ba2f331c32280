use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::price::{PricePoint, PriceSample};

/// Trait abstraction for market-data providers.
///
/// Each API (Yahoo Finance, Alpha Vantage) implements this trait. If an API
/// stops working or changes, only that one implementation is replaced.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Daily closes for the last few trading sessions, sorted by date.
    /// Must cover at least the two most recent sessions when the symbol trades.
    async fn get_recent_closes(&self, symbol: &str) -> Result<Vec<PricePoint>, CoreError>;
}

/// The price-lookup contract the performance calculator consumes.
///
/// Never fails: anything that goes wrong is reported as an unavailable sample.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn lookup(&self, ticker: &str) -> PriceSample;
}

/// Produces a free-text analysis of a rendered report.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, system_prompt: &str, content: &str) -> Result<String, CoreError>;
}

/// Delivers a finished report (e.g., by email).
#[async_trait]
pub trait ReportDelivery: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, subject: &str, html_body: &str) -> Result<(), CoreError>;
}
