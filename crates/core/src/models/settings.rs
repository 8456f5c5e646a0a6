use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

/// Dashboard configuration, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Earliest date the date-range slider allows.
    pub range_floor: NaiveDate,

    /// Start of the date range preselected in the form.
    pub default_start: NaiveDate,

    /// Longest accepted date range, in days.
    pub max_range_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            range_floor: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            default_start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
            max_range_days: 3650,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_range_days <= 0 {
            return Err(CoreError::ValidationError(format!(
                "max_range_days must be positive, got {}",
                self.max_range_days
            )));
        }
        if self.default_start < self.range_floor {
            return Err(CoreError::ValidationError(format!(
                "default_start ({}) must not be before range_floor ({})",
                self.default_start, self.range_floor
            )));
        }
        Ok(())
    }

    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys.get(provider).map(String::as_str)
    }
}
