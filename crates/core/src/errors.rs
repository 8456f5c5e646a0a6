use thiserror::Error;

/// Unified error type for the entire ticker-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No market data provider registered")]
    NoProvider,

    // ── Market Data ─────────────────────────────────────────────────
    #[error("No data available for '{symbol}': {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    // ── Indicators ──────────────────────────────────────────────────
    #[error("Insufficient data for {indicator}: need at least {required} records, got {actual}")]
    InsufficientData {
        indicator: String,
        required: usize,
        actual: usize,
    },

    // ── Input / Serialization ───────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// `true` for failures of the data-retrieval step (bad ticker, provider
    /// or transport error, empty range). These are the failures the dashboard
    /// reports as "ticker name must be supplied".
    #[must_use]
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Api { .. }
                | CoreError::Network(_)
                | CoreError::NoProvider
                | CoreError::DataUnavailable { .. }
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full request URL, including the API key
        // in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
