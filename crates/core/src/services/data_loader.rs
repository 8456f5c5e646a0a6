use chrono::NaiveDate;
use futures::future::try_join_all;

use crate::errors::CoreError;
use crate::models::ohlc::Series;
use crate::models::settings::Settings;
use crate::providers::registry::ProviderRegistry;

/// Loads daily OHLC series from the registered providers.
///
/// Providers are tried in registration order; if the primary fails (API
/// down, rate limited, unknown symbol), the next one is tried. Nothing is
/// cached: every submission fetches fresh data.
pub struct DataLoader {
    registry: ProviderRegistry,
    max_range_days: i64,
}

impl DataLoader {
    pub fn new(registry: ProviderRegistry, settings: &Settings) -> Self {
        Self {
            registry,
            max_range_days: settings.max_range_days,
        }
    }

    /// Names of the configured providers, in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Fetch the series for one symbol.
    ///
    /// Fails with `DataUnavailable` for an empty symbol or when no provider
    /// returns any record in the range.
    pub async fn fetch(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Series, CoreError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::DataUnavailable {
                symbol: String::new(),
                reason: "no ticker symbol given".into(),
            });
        }
        self.validate_range(from, to)?;

        if self.registry.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in self.registry.providers() {
            tracing::debug!(provider = provider.name(), symbol, %from, %to, "Fetching daily series");
            match provider.fetch_daily(symbol, from, to).await {
                Ok(series) => match Self::check_series(&series, from, to) {
                    Ok(()) => return Ok(series),
                    Err(e) => last_error = Some(e),
                },
                Err(e) => {
                    tracing::warn!(provider = provider.name(), symbol, error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    /// Fetch several symbols concurrently. All must succeed; the first
    /// failure discards every other result.
    pub async fn fetch_all(
        &self,
        symbols: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Series>, CoreError> {
        try_join_all(symbols.iter().map(|s| self.fetch(s, from, to))).await
    }

    fn validate_range(&self, from: NaiveDate, to: NaiveDate) -> Result<(), CoreError> {
        if from > to {
            return Err(CoreError::ValidationError(format!(
                "'from' date ({from}) must not be after 'to' date ({to})"
            )));
        }
        let range_days = (to - from).num_days();
        if range_days > self.max_range_days {
            return Err(CoreError::ValidationError(format!(
                "Date range of {range_days} days exceeds maximum of {} days",
                self.max_range_days
            )));
        }
        Ok(())
    }

    /// Reject empty results and non-finite prices.
    fn check_series(series: &Series, from: NaiveDate, to: NaiveDate) -> Result<(), CoreError> {
        if series.is_empty() {
            return Err(CoreError::DataUnavailable {
                symbol: series.symbol().to_string(),
                reason: format!("no price data between {from} and {to}"),
            });
        }
        if let Some(bad) = series.records().iter().find(|r| !r.is_finite()) {
            return Err(CoreError::DataUnavailable {
                symbol: series.symbol().to_string(),
                reason: format!("non-finite price on {}", bad.date),
            });
        }
        Ok(())
    }
}
