use chrono::NaiveDate;
use serde::Serialize;

use crate::models::chart::Chart;
use crate::models::indicator::Indicator;
use crate::models::settings::Settings;

pub const DASHBOARD_TITLE: &str = "Financial Dashboard";

/// Number of ticker slots on the dashboard.
pub const TICKER_SLOTS: usize = 4;

const PLACEHOLDERS: [&str; TICKER_SLOTS] = [
    "Enter Ticker Name (Example AAPL for Apple)",
    "Enter Ticker Name (Example TSLA for Tesla)",
    "Enter Ticker Name (Example GOOG for Google)",
    "Enter Ticker Name (Example META for Facebook)",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerInput {
    pub title: String,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRangeSlider {
    pub title: &'static str,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub value: (NaiveDate, NaiveDate),
}

/// The input form shown above whatever the dashboard currently displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputForm {
    pub title: &'static str,
    pub tickers: Vec<TickerInput>,
    pub date_range: DateRangeSlider,
    pub indicator_title: &'static str,
    pub indicator_options: Vec<&'static str>,
    pub button_label: &'static str,
}

impl InputForm {
    /// Form with the slider running from the configured floor to `today`.
    pub fn new(settings: &Settings, today: NaiveDate) -> Self {
        let tickers = PLACEHOLDERS
            .iter()
            .enumerate()
            .map(|(i, placeholder)| TickerInput {
                title: format!("Ticker {}", i + 1),
                placeholder,
            })
            .collect();

        Self {
            title: DASHBOARD_TITLE,
            tickers,
            date_range: DateRangeSlider {
                title: "Date Range:",
                start: settings.range_floor,
                end: today,
                value: (settings.default_start.min(today), today),
            },
            indicator_title: "Select Indicator(s):",
            indicator_options: Indicator::ALL.iter().map(|i| i.display_name()).collect(),
            button_label: "Load Data",
        }
    }
}

/// One titled chart.
#[derive(Debug, Clone, Serialize)]
pub struct TickerPanel {
    pub ticker: String,
    pub chart: Chart,
}

/// Four charts laid out as two rows; each row shares one time axis.
#[derive(Debug, Clone, Serialize)]
pub struct ChartsView {
    pub panels: Vec<TickerPanel>,
    /// Non-fatal remarks, such as ignored indicator names.
    pub notices: Vec<String>,
}

impl ChartsView {
    /// Panels grouped into rows of two: (1, 2) and (3, 4).
    pub fn rows(&self) -> impl Iterator<Item = &[TickerPanel]> {
        self.panels.chunks(2)
    }

    pub fn chart(&self, index: usize) -> Option<&Chart> {
        self.panels.get(index).map(|p| &p.chart)
    }
}

/// Message panel replacing all charts when a submission fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPanel {
    pub message: String,
}

impl ErrorPanel {
    pub fn new(detail: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Error: Ticker Name must be supplied. {detail}."),
        }
    }
}

/// What is displayed below the form.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "content")]
pub enum ViewBody {
    /// Nothing submitted yet
    Empty,
    Charts(ChartsView),
    Error(ErrorPanel),
}

/// Everything the frontend renders: the form plus the current body.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub form: InputForm,
    pub body: ViewBody,
}
