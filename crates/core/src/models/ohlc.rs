use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// One trading day of price data.
///
/// Provider data is trusted to satisfy
/// `low <= min(open, close) <= max(open, close) <= high`; nothing here checks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcRecord {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    /// Close strictly above open.
    pub fn is_gain(&self) -> bool {
        self.close > self.open
    }

    /// Open strictly above close.
    pub fn is_loss(&self) -> bool {
        self.open > self.close
    }

    /// All four prices are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }

    /// Midnight UTC of `date`, in milliseconds since the Unix epoch.
    /// This is the x coordinate charts use for the record.
    pub fn timestamp_ms(&self) -> i64 {
        date_to_epoch_ms(self.date)
    }
}

/// Daily OHLC history of one symbol, ordered by strictly increasing date.
///
/// Trading days only, so spacing between records is not uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    symbol: String,
    records: Vec<OhlcRecord>,
}

impl Series {
    /// Build a series, rejecting records that are not strictly increasing by date.
    pub fn new(symbol: impl Into<String>, records: Vec<OhlcRecord>) -> Result<Self, CoreError> {
        let symbol = symbol.into();
        if let Some(pair) = records.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(CoreError::ValidationError(format!(
                "Series for {symbol} is not strictly increasing by date: {} followed by {}",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { symbol, records })
    }

    /// Build a series from records in any order. Records are sorted by date and
    /// duplicate dates collapse to the last record seen for that date.
    pub fn from_unordered(symbol: impl Into<String>, mut records: Vec<OhlcRecord>) -> Self {
        // Stable sort keeps provider order within a date; reversing before
        // dedup makes the later duplicate win.
        records.sort_by_key(|r| r.date);
        records.reverse();
        records.dedup_by_key(|r| r.date);
        records.reverse();
        Self {
            symbol: symbol.into(),
            records,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn records(&self) -> &[OhlcRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&OhlcRecord> {
        self.records.last()
    }

    /// Close prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.close).collect()
    }

    /// Records with close above open.
    pub fn gains(&self) -> impl Iterator<Item = &OhlcRecord> {
        self.records.iter().filter(|r| r.is_gain())
    }

    /// Records with open above close.
    pub fn losses(&self) -> impl Iterator<Item = &OhlcRecord> {
        self.records.iter().filter(|r| r.is_loss())
    }

    /// First and last timestamp (ms) of the series, if any.
    pub fn time_extent_ms(&self) -> Option<(i64, i64)> {
        Some((self.first()?.timestamp_ms(), self.last()?.timestamp_ms()))
    }
}

/// Midnight UTC of `date` as epoch milliseconds.
pub fn date_to_epoch_ms(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .timestamp_millis()
}

/// Calendar date (UTC) of an epoch-millisecond timestamp.
pub fn epoch_ms_to_date(ms: i64) -> Result<NaiveDate, CoreError> {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| CoreError::ValidationError(format!("Timestamp {ms} ms is out of range")))
}
