use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::price::{PricePoint, PriceSample};
use crate::providers::registry::PriceProviderRegistry;
use crate::providers::traits::{PriceLookup, PriceProvider};

/// Fetches the last two session closes for a ticker with provider fallback.
///
/// - Providers are tried in registration order; each gets one attempt.
/// - Every attempt is bounded by `timeout`; a timeout counts as a failure.
/// - A provider that answers with fewer than two sessions also falls through
///   to the next one.
/// - Nothing is cached: every report cycle fetches fresh data.
pub struct PriceService {
    registry: PriceProviderRegistry,
    timeout: Duration,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Get the names of all registered providers, in priority order.
    pub fn get_provider_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }

    /// Fetch a sample, reporting why it could not be produced.
    pub async fn fetch_sample(&self, ticker: &str) -> Result<PriceSample, CoreError> {
        if self.registry.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in self.registry.providers() {
            match self.fetch_from(provider, ticker).await {
                Ok(history) => {
                    let sample = PriceSample::from_history(ticker, &history);
                    if sample.available {
                        return Ok(sample);
                    }
                    last_error = Some(CoreError::DataUnavailable {
                        symbol: ticker.to_string(),
                        reason: format!(
                            "{} returned {} session(s), need 2",
                            provider.name(),
                            history.len()
                        ),
                    });
                }
                Err(e) => {
                    debug!(provider = provider.name(), ticker, error = %e, "Price provider failed");
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    /// One bounded call to one provider.
    async fn fetch_from(
        &self,
        provider: &dyn PriceProvider,
        ticker: &str,
    ) -> Result<Vec<PricePoint>, CoreError> {
        tokio::time::timeout(self.timeout, provider.get_recent_closes(ticker))
            .await
            .map_err(|_| CoreError::Timeout {
                provider: provider.name().to_string(),
                symbol: ticker.to_string(),
            })?
    }
}

#[async_trait]
impl PriceLookup for PriceService {
    async fn lookup(&self, ticker: &str) -> PriceSample {
        match self.fetch_sample(ticker).await {
            Ok(sample) => sample,
            Err(e) => {
                warn!(ticker, error = %e, "No price data");
                PriceSample::unavailable(ticker)
            }
        }
    }
}
