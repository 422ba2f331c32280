// ═══════════════════════════════════════════════════════════════════
// Provider Tests — Registry ordering, PriceService fallback/timeout
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stock_report_core::errors::CoreError;
use stock_report_core::models::price::PricePoint;
use stock_report_core::providers::alphavantage::AlphaVantageProvider;
use stock_report_core::providers::registry::PriceProviderRegistry;
use stock_report_core::providers::traits::{PriceLookup, PriceProvider};
use stock_report_core::services::price_service::PriceService;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

fn closes(values: &[Decimal]) -> Vec<PricePoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, close)| PricePoint {
            date: NaiveDate::from_ymd_opt(2025, 1, 13).unwrap() + chrono::Duration::days(i as i64),
            close: *close,
        })
        .collect()
}

/// Answers from a fixed table; unknown symbols fail.
struct MockProvider {
    name: String,
    history: HashMap<String, Vec<PricePoint>>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            history: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with(mut self, symbol: &str, values: &[Decimal]) -> Self {
        self.history.insert(symbol.to_string(), closes(values));
        self
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_recent_closes(&self, symbol: &str) -> Result<Vec<PricePoint>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.history.get(symbol).cloned().ok_or_else(|| CoreError::Api {
            provider: self.name.clone(),
            message: format!("Unknown symbol {symbol}"),
        })
    }
}

/// Never answers within any reasonable timeout.
struct HangingProvider;

#[async_trait]
impl PriceProvider for HangingProvider {
    fn name(&self) -> &str {
        "Hanging"
    }

    async fn get_recent_closes(&self, _symbol: &str) -> Result<Vec<PricePoint>, CoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![])
    }
}

fn service(providers: Vec<Box<dyn PriceProvider>>) -> PriceService {
    let mut registry = PriceProviderRegistry::new();
    for p in providers {
        registry.register(p);
    }
    PriceService::new(registry, Duration::from_millis(50))
}

// ═══════════════════════════════════════════════════════════════════
// PriceProviderRegistry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn new_creates_empty_registry() {
        let registry = PriceProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.provider_names().is_empty());
    }

    #[test]
    fn default_creates_empty_registry() {
        assert!(PriceProviderRegistry::default().is_empty());
    }

    #[test]
    fn keeps_registration_order() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("Primary")));
        registry.register(Box::new(MockProvider::new("Fallback")));
        assert_eq!(registry.provider_names(), vec!["Primary", "Fallback"]);
    }

    #[test]
    fn defaults_add_alpha_vantage_only_with_key() {
        let without = PriceProviderRegistry::new_with_defaults(&HashMap::new());
        assert!(!without.provider_names().contains(&"Alpha Vantage".to_string()));

        let mut keys = HashMap::new();
        keys.insert("alphavantage".to_string(), "demo".to_string());
        let with = PriceProviderRegistry::new_with_defaults(&keys);
        assert_eq!(with.provider_names().last().map(String::as_str), Some("Alpha Vantage"));
    }

    #[test]
    fn alpha_vantage_name() {
        let provider = AlphaVantageProvider::new("demo".into());
        assert_eq!(provider.name(), "Alpha Vantage");
    }
}

// ═══════════════════════════════════════════════════════════════════
// PriceService
// ═══════════════════════════════════════════════════════════════════

mod price_service {
    use super::*;

    #[tokio::test]
    async fn primary_answer_is_used() {
        let svc = service(vec![Box::new(
            MockProvider::new("Primary").with("AAPL", &[dec!(99), dec!(100), dec!(105)]),
        )]);
        let sample = svc.lookup("AAPL").await;
        assert!(sample.available);
        assert_eq!(sample.ticker, "AAPL");
        assert_eq!(sample.previous_close, dec!(100));
        assert_eq!(sample.current_close, dec!(105));
    }

    #[tokio::test]
    async fn falls_back_when_primary_fails() {
        let svc = service(vec![
            Box::new(MockProvider::new("Primary")),
            Box::new(MockProvider::new("Fallback").with("MSFT", &[dec!(400), dec!(404)])),
        ]);
        let sample = svc.lookup("MSFT").await;
        assert!(sample.available);
        assert_eq!(sample.current_close, dec!(404));
    }

    #[tokio::test]
    async fn falls_back_when_primary_has_one_session() {
        let svc = service(vec![
            Box::new(MockProvider::new("Primary").with("NEWCO", &[dec!(10)])),
            Box::new(MockProvider::new("Fallback").with("NEWCO", &[dec!(9), dec!(10)])),
        ]);
        assert!(svc.lookup("NEWCO").await.available);
    }

    #[tokio::test]
    async fn insufficient_history_everywhere_is_unavailable() {
        let svc = service(vec![Box::new(MockProvider::new("Primary").with("NEWCO", &[dec!(10)]))]);
        let err = svc.fetch_sample("NEWCO").await.unwrap_err();
        assert!(matches!(err, CoreError::DataUnavailable { .. }));
        assert!(!svc.lookup("NEWCO").await.available);
    }

    #[tokio::test]
    async fn timeout_counts_as_failure_and_falls_back() {
        let svc = service(vec![
            Box::new(HangingProvider),
            Box::new(MockProvider::new("Fallback").with("AAPL", &[dec!(1), dec!(2)])),
        ]);
        let sample = svc.lookup("AAPL").await;
        assert!(sample.available);
        assert_eq!(sample.current_close, dec!(2));
    }

    #[tokio::test]
    async fn timeout_alone_is_reported() {
        let svc = service(vec![Box::new(HangingProvider)]);
        let err = svc.fetch_sample("AAPL").await.unwrap_err();
        assert!(matches!(err, CoreError::Timeout { ref symbol, .. } if symbol == "AAPL"));
    }

    #[tokio::test]
    async fn no_providers_is_unavailable() {
        let svc = service(vec![]);
        assert!(matches!(svc.fetch_sample("AAPL").await, Err(CoreError::NoProvider)));
        assert!(!svc.lookup("AAPL").await.available);
    }

    #[tokio::test]
    async fn each_provider_is_tried_once() {
        let primary = MockProvider::new("Primary");
        let calls = Arc::clone(&primary.calls);
        let svc = service(vec![Box::new(primary)]);
        let _ = svc.lookup("NOPE").await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn provider_names_in_priority_order() {
        let svc = service(vec![
            Box::new(MockProvider::new("A")),
            Box::new(MockProvider::new("B")),
        ]);
        assert_eq!(svc.get_provider_names(), vec!["A", "B"]);
    }
}
