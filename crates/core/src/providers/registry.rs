use std::collections::HashMap;

use tracing::warn;

use super::alphavantage::AlphaVantageProvider;
use super::traits::PriceProvider;
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all available price providers, in priority order.
///
/// The first registered provider is the primary; the rest are fallbacks.
pub struct PriceProviderRegistry {
    providers: Vec<Box<dyn PriceProvider>>,
}

impl PriceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();

        // Yahoo Finance: no API key needed, primary
        match YahooFinanceProvider::new() {
            Ok(yahoo) => registry.register(Box::new(yahoo)),
            Err(e) => warn!("Yahoo Finance provider unavailable: {e}"),
        }

        // Alpha Vantage: needs an API key, fallback
        if let Some(key) = api_keys.get("alphavantage") {
            registry.register(Box::new(AlphaVantageProvider::new(key.clone())));
        }

        registry
    }

    /// Register a new price provider at the lowest priority.
    pub fn register(&mut self, provider: Box<dyn PriceProvider>) {
        self.providers.push(provider);
    }

    /// All providers, ordered by registration priority.
    pub fn providers(&self) -> impl Iterator<Item = &dyn PriceProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
