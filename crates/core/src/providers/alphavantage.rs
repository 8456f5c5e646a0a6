use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::ohlc::{OhlcRecord, Series};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// "compact" responses hold the latest 100 trading days, which is about
/// 140 calendar days.
const COMPACT_WINDOW_DAYS: i64 = 140;

/// Alpha Vantage API provider for daily stock history.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Coverage**: 100k+ global equity symbols.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
        }
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyData>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Deserialize)]
struct DailyData {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
}

impl DailyData {
    fn to_record(&self, date: NaiveDate) -> Option<OhlcRecord> {
        Some(OhlcRecord::new(
            date,
            self.open.parse().ok()?,
            self.high.parse().ok()?,
            self.low.parse().ok()?,
            self.close.parse().ok()?,
        ))
    }
}

/// Parse a `TIME_SERIES_DAILY` JSON body into a series restricted to
/// `from..=to`. Entries with unparseable dates or prices are skipped.
pub fn parse_daily_series(
    symbol: &str,
    body: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Series, CoreError> {
    let resp: TimeSeriesResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: PROVIDER.into(),
        message: format!("Failed to parse time series for {symbol}: {e}"),
    })?;

    if let Some(message) = resp.error_message {
        return Err(CoreError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: message,
        });
    }

    let time_series = resp.time_series.ok_or_else(|| CoreError::Api {
        provider: PROVIDER.into(),
        message: resp.note.or(resp.information).unwrap_or_else(|| {
            format!("No time series data for {symbol}. API limit may be exceeded.")
        }),
    })?;

    let records: Vec<OhlcRecord> = time_series
        .iter()
        .filter_map(|(date_str, data)| {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
            if date >= from && date <= to {
                data.to_record(date)
            } else {
                None
            }
        })
        .collect();

    Ok(Series::from_unordered(symbol, records))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MarketDataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_daily(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Series, CoreError> {
        let today = chrono::Utc::now().date_naive();
        let output_size = if (today - from).num_days() <= COMPACT_WINDOW_DAYS {
            "compact"
        } else {
            "full"
        };

        let body = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", &symbol.to_uppercase()),
                ("outputsize", output_size),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .text()
            .await?;

        parse_daily_series(symbol, &body, from, to)
    }
}
