use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::ohlc::Series;

/// Trait abstraction for daily market data sources.
///
/// Each upstream API implements this trait. If an API stops working or
/// changes, only that implementation is replaced.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Daily OHLC records for `symbol` between `from` and `to` (inclusive),
    /// sorted by date.
    async fn fetch_daily(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Series, CoreError>;
}
