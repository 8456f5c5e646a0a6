// ═══════════════════════════════════════════════════════════════════
// Provider Tests: Registry, Alpha Vantage parsing, Yahoo Finance
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;

use ticker_dashboard_core::errors::CoreError;
use ticker_dashboard_core::models::ohlc::Series;
use ticker_dashboard_core::models::settings::Settings;
use ticker_dashboard_core::providers::alphavantage::{parse_daily_series, AlphaVantageProvider};
use ticker_dashboard_core::providers::registry::ProviderRegistry;
use ticker_dashboard_core::providers::traits::MarketDataProvider;
use ticker_dashboard_core::providers::yahoo_finance::YahooFinanceProvider;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Test Helpers: Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// A mock provider that always returns an empty series.
struct MockProvider {
    name: String,
}

impl MockProvider {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_daily(
        &self,
        symbol: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Series, CoreError> {
        Ok(Series::from_unordered(symbol, vec![]))
    }
}

// ═══════════════════════════════════════════════════════════════════
// ProviderRegistry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn new_is_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.names().is_empty());
    }

    #[test]
    fn default_is_empty() {
        assert!(ProviderRegistry::default().is_empty());
    }

    #[test]
    fn register_keeps_priority_order() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("First")));
        registry.register(Box::new(MockProvider::new("Second")));
        registry.register(Box::new(MockProvider::new("Third")));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["First", "Second", "Third"]);
        let names: Vec<&str> = registry.providers().map(|p| p.name()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }
}

mod registry_defaults {
    use super::*;

    #[test]
    fn without_api_key_only_yahoo() {
        let registry = ProviderRegistry::new_with_defaults(&Settings::default());
        assert_eq!(registry.names(), vec!["Yahoo Finance"]);
    }

    #[test]
    fn with_alphavantage_key_has_fallback() {
        let mut settings = Settings::default();
        settings
            .api_keys
            .insert("alphavantage".to_string(), "av-key".to_string());
        let registry = ProviderRegistry::new_with_defaults(&settings);

        // Yahoo Finance (primary) + Alpha Vantage (fallback)
        assert_eq!(registry.names(), vec!["Yahoo Finance", "Alpha Vantage"]);
    }

    #[test]
    fn irrelevant_keys_ignored() {
        let mut settings = Settings::default();
        settings
            .api_keys
            .insert("unknown_provider".to_string(), "whatever".to_string());
        let registry = ProviderRegistry::new_with_defaults(&settings);
        assert_eq!(registry.len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// AlphaVantageProvider: response parsing
// ═══════════════════════════════════════════════════════════════════

mod alphavantage {
    use super::*;

    const BODY: &str = r#"{
        "Meta Data": {"2. Symbol": "IBM"},
        "Time Series (Daily)": {
            "2024-01-05": {"1. open": "160.00", "2. high": "161.50", "3. low": "159.00", "4. close": "161.00", "5. volume": "100"},
            "2024-01-03": {"1. open": "158.00", "2. high": "159.00", "3. low": "156.00", "4. close": "157.00", "5. volume": "100"},
            "2024-01-04": {"1. open": "157.00", "2. high": "158.00", "3. low": "156.50", "4. close": "157.00", "5. volume": "100"},
            "2023-12-29": {"1. open": "150.00", "2. high": "151.00", "3. low": "149.00", "4. close": "150.50", "5. volume": "100"}
        }
    }"#;

    #[test]
    fn name() {
        let provider = AlphaVantageProvider::new("key".into());
        assert_eq!(provider.name(), "Alpha Vantage");
    }

    #[test]
    fn parses_and_sorts_records_in_range() {
        let series = parse_daily_series("IBM", BODY, d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(series.symbol(), "IBM");
        let dates: Vec<NaiveDate> = series.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 5)]);

        let first = series.records()[0];
        assert_eq!(first.open, 158.0);
        assert_eq!(first.high, 159.0);
        assert_eq!(first.low, 156.0);
        assert_eq!(first.close, 157.0);
    }

    #[test]
    fn range_is_inclusive() {
        let series = parse_daily_series("IBM", BODY, d(2024, 1, 3), d(2024, 1, 4)).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn out_of_range_is_empty() {
        let series = parse_daily_series("IBM", BODY, d(2025, 1, 1), d(2025, 2, 1)).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn skips_unparseable_entries() {
        let body = r#"{"Time Series (Daily)": {
            "2024-01-03": {"1. open": "x", "2. high": "1", "3. low": "1", "4. close": "1"},
            "not-a-date": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1"},
            "2024-01-04": {"1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.5"}
        }}"#;
        let series = parse_daily_series("X", body, d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].date, d(2024, 1, 4));
    }

    #[test]
    fn error_message_is_data_unavailable() {
        let body = r#"{"Error Message": "Invalid API call."}"#;
        match parse_daily_series("NOPE", body, d(2024, 1, 1), d(2024, 1, 31)) {
            Err(CoreError::DataUnavailable { symbol, reason }) => {
                assert_eq!(symbol, "NOPE");
                assert_eq!(reason, "Invalid API call.");
            }
            other => panic!("Expected DataUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn rate_limit_note_is_api_error() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        match parse_daily_series("IBM", body, d(2024, 1, 1), d(2024, 1, 31)) {
            Err(CoreError::Api { provider, message }) => {
                assert_eq!(provider, "Alpha Vantage");
                assert!(message.contains("frequency"));
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn missing_series_is_api_error() {
        match parse_daily_series("IBM", "{}", d(2024, 1, 1), d(2024, 1, 31)) {
            Err(CoreError::Api { message, .. }) => assert!(message.contains("IBM")),
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_api_error() {
        assert!(matches!(
            parse_daily_series("IBM", "<html>", d(2024, 1, 1), d(2024, 1, 31)),
            Err(CoreError::Api { .. })
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// YahooFinanceProvider
// ═══════════════════════════════════════════════════════════════════

mod yahoo_finance {
    use super::*;

    #[test]
    fn name() {
        let provider = YahooFinanceProvider::new().unwrap();
        assert_eq!(provider.name(), "Yahoo Finance");
    }

    #[test]
    fn providers_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<YahooFinanceProvider>();
        assert_send_sync::<AlphaVantageProvider>();
    }

    #[test]
    fn can_be_boxed_in_registry() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(YahooFinanceProvider::new().unwrap()));
        assert_eq!(registry.names(), vec!["Yahoo Finance"]);
    }
}
