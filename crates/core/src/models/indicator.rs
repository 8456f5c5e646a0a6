use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// The fixed vocabulary of technical indicators a chart can overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Indicator {
    /// 30-record simple moving average of close
    Sma30,
    /// 100-record simple moving average of close
    Sma100,
    /// 200-record simple moving average of close
    Sma200,
    /// Least-squares line through (index, close) over the whole series
    LinearTrend,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Sma30,
        Indicator::Sma100,
        Indicator::Sma200,
        Indicator::LinearTrend,
    ];

    /// Legend label and form option text.
    pub fn display_name(&self) -> &'static str {
        match self {
            Indicator::Sma30 => "30 Day SMA",
            Indicator::Sma100 => "100 Day SMA",
            Indicator::Sma200 => "200 Day SMA",
            Indicator::LinearTrend => "Linear Regression Line",
        }
    }

    /// Short identifier ("SMA-30", "Linear-Trend").
    pub fn id(&self) -> &'static str {
        match self {
            Indicator::Sma30 => "SMA-30",
            Indicator::Sma100 => "SMA-100",
            Indicator::Sma200 => "SMA-200",
            Indicator::LinearTrend => "Linear-Trend",
        }
    }

    /// Look-back window for moving averages, `None` for the trend line.
    pub fn window(&self) -> Option<usize> {
        match self {
            Indicator::Sma30 => Some(30),
            Indicator::Sma100 => Some(100),
            Indicator::Sma200 => Some(200),
            Indicator::LinearTrend => None,
        }
    }

    /// Overlay line colour.
    pub fn color(&self) -> &'static str {
        match self {
            Indicator::Sma30 => "purple",
            Indicator::Sma100 => "blue",
            Indicator::Sma200 => "yellow",
            Indicator::LinearTrend => "red",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Indicator {
    type Err = CoreError;

    /// Accepts either the display name or the short id, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Indicator::ALL
            .into_iter()
            .find(|i| {
                i.display_name().eq_ignore_ascii_case(wanted) || i.id().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown indicator '{s}'")))
    }
}

/// A set of selected indicators. Order is irrelevant and duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSelection {
    indicators: BTreeSet<Indicator>,
}

impl IndicatorSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every indicator in the vocabulary.
    pub fn all() -> Self {
        Indicator::ALL.into_iter().collect()
    }

    /// Parse user-supplied names. Unrecognized names do not fail the parse:
    /// they are returned alongside the selection so the caller can report them.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> (Self, Vec<String>) {
        let mut selection = Self::new();
        let mut ignored = Vec::new();
        for name in names {
            match name.as_ref().parse::<Indicator>() {
                Ok(indicator) => {
                    selection.insert(indicator);
                }
                Err(_) => ignored.push(name.as_ref().to_string()),
            }
        }
        (selection, ignored)
    }

    pub fn insert(&mut self, indicator: Indicator) -> bool {
        self.indicators.insert(indicator)
    }

    pub fn contains(&self, indicator: Indicator) -> bool {
        self.indicators.contains(&indicator)
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Indicator> + '_ {
        self.indicators.iter().copied()
    }
}

impl FromIterator<Indicator> for IndicatorSelection {
    fn from_iter<T: IntoIterator<Item = Indicator>>(iter: T) -> Self {
        Self {
            indicators: iter.into_iter().collect(),
        }
    }
}

/// One value per source record; `None` where the look-back window is not yet full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

impl DerivedSeries {
    /// Dated values that are present, in series order.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Two-point line from a least-squares fit over the whole series.
///
/// The slope is in price per record, not per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSegment {
    pub start_date: NaiveDate,
    pub start_value: f64,
    pub end_date: NaiveDate,
    pub end_value: f64,
    pub slope: f64,
    pub intercept: f64,
}

/// What the indicator engine produced for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndicatorOutput {
    Line(DerivedSeries),
    Segment(TrendSegment),
}

/// Engine result keyed by indicator.
pub type IndicatorOutputs = BTreeMap<Indicator, IndicatorOutput>;
