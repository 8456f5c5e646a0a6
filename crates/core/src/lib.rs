pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use models::{
    chart::{AxisRange, Chart, XAxis},
    indicator::IndicatorSelection,
    ohlc::{date_to_epoch_ms, epoch_ms_to_date, Series},
    settings::Settings,
    view::{ChartsView, DashboardView, ErrorPanel, InputForm, TickerPanel, ViewBody, TICKER_SLOTS},
};
use providers::registry::ProviderRegistry;
use serde::{Deserialize, Serialize};
use services::{chart_service::ChartService, data_loader::DataLoader};

use errors::CoreError;

/// One press of the "Load Data" button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Ticker symbols as typed; trimmed and uppercased before use.
    pub tickers: [String; TICKER_SLOTS],
    /// Start of the date range, epoch milliseconds.
    pub start_epoch_ms: i64,
    /// End of the date range, epoch milliseconds.
    pub end_epoch_ms: i64,
    /// Indicator names (display names or short ids).
    pub indicators: Vec<String>,
}

impl SubmitRequest {
    /// Build a request from calendar dates instead of timestamps.
    pub fn for_dates(
        tickers: [&str; TICKER_SLOTS],
        from: NaiveDate,
        to: NaiveDate,
        indicators: &[&str],
    ) -> Self {
        Self {
            tickers: tickers.map(str::to_string),
            start_epoch_ms: date_to_epoch_ms(from),
            end_epoch_ms: date_to_epoch_ms(to),
            indicators: indicators.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Main entry point for the Ticker Dashboard core library.
///
/// Holds the current view explicitly: the frontend renders whatever
/// `view()` returns, and every submission replaces it wholesale.
#[must_use]
pub struct Dashboard {
    settings: Settings,
    loader: DataLoader,
    chart_service: ChartService,
    view: DashboardView,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match &self.view.body {
            ViewBody::Empty => "Empty",
            ViewBody::Charts(_) => "Charts",
            ViewBody::Error(_) => "Error",
        };
        f.debug_struct("Dashboard")
            .field("providers", &self.loader.provider_names())
            .field("body", &body)
            .finish()
    }
}

impl Dashboard {
    /// Dashboard with default settings and the default provider set.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Dashboard with the default providers configured from `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        let registry = ProviderRegistry::new_with_defaults(&settings);
        Self::with_registry(registry, settings)
    }

    /// Dashboard over an explicit provider registry.
    pub fn with_registry(registry: ProviderRegistry, settings: Settings) -> Self {
        let today = chrono::Utc::now().date_naive();
        let form = InputForm::new(&settings, today);
        Self {
            loader: DataLoader::new(registry, &settings),
            chart_service: ChartService::new(),
            view: DashboardView {
                form,
                body: ViewBody::Empty,
            },
            settings,
        }
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Handle a submission: load all four tickers, build the paired charts
    /// and replace the current view.
    ///
    /// Any failure replaces the whole body with an error panel; charts are
    /// never shown for a partially successful submission.
    pub async fn on_submit(&mut self, request: SubmitRequest) -> &DashboardView {
        let body = match self.render(&request).await {
            Ok(charts) => {
                tracing::info!(charts = charts.panels.len(), "Charts rendered");
                ViewBody::Charts(charts)
            }
            Err(e) => {
                if e.is_retrieval_failure() {
                    tracing::warn!(error = %e, "Data retrieval failed");
                } else {
                    tracing::error!(error = %e, "Submission failed");
                }
                ViewBody::Error(ErrorPanel::new(&e))
            }
        };
        self.refresh_form();
        self.view.body = body;
        &self.view
    }

    async fn render(&self, request: &SubmitRequest) -> Result<ChartsView, CoreError> {
        let from = epoch_ms_to_date(request.start_epoch_ms)?;
        let to = epoch_ms_to_date(request.end_epoch_ms)?;
        let tickers: Vec<String> = request
            .tickers
            .iter()
            .map(|t| t.trim().to_uppercase())
            .collect();

        let (selection, ignored) = IndicatorSelection::parse(&request.indicators);
        let notices: Vec<String> = ignored
            .iter()
            .map(|name| format!("Ignored unknown indicator '{name}'"))
            .collect();
        if !ignored.is_empty() {
            tracing::warn!(?ignored, "Unknown indicators ignored");
        }

        tracing::info!(?tickers, %from, %to, indicators = selection.len(), "Loading tickers");
        let series = self.loader.fetch_all(&tickers, from, to).await?;

        let mut panels = Vec::with_capacity(TICKER_SLOTS);
        // Rows of two: the first chart of a row owns its axis, the second follows it.
        for pair in tickers.iter().zip(&series).collect::<Vec<_>>().chunks(2) {
            let mut leader_axis = None;
            for (ticker, data) in pair {
                let chart = self.build_chart(data, &selection, leader_axis.as_ref())?;
                if leader_axis.is_none() {
                    leader_axis = Some(chart.x_axis.clone());
                }
                panels.push(TickerPanel {
                    ticker: ticker.to_string(),
                    chart,
                });
            }
        }

        Ok(ChartsView { panels, notices })
    }

    fn build_chart(
        &self,
        series: &Series,
        selection: &IndicatorSelection,
        shared_axis: Option<&XAxis>,
    ) -> Result<Chart, CoreError> {
        self.chart_service
            .build_with_indicators(series, selection, shared_axis)
    }

    // ── View ────────────────────────────────────────────────────────

    /// What the frontend should display right now.
    #[must_use]
    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// The current view as pretty-printed JSON.
    pub fn view_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.view)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize view: {e}")))
    }

    /// Drop any charts or error panel and show only the form.
    pub fn clear(&mut self) {
        self.refresh_form();
        self.view.body = ViewBody::Empty;
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Names of the configured data providers, in priority order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.loader.provider_names()
    }

    // ── Axis interaction ────────────────────────────────────────────

    /// Visible range of chart `index` (0-based), if charts are shown.
    #[must_use]
    pub fn chart_range(&self, index: usize) -> Option<AxisRange> {
        self.charts()
            .and_then(|c| c.chart(index))
            .map(|chart| chart.x_axis.range())
    }

    /// Pan chart `index`; its row partner moves with it.
    pub fn pan_chart(&self, index: usize, delta_ms: f64) -> Result<(), CoreError> {
        self.chart_axis(index)?.pan(delta_ms)
    }

    /// Zoom chart `index` around `anchor_ms`; its row partner follows.
    pub fn zoom_chart(&self, index: usize, factor: f64, anchor_ms: f64) -> Result<(), CoreError> {
        self.chart_axis(index)?.zoom(factor, anchor_ms)
    }

    /// Reset chart `index` (and its row partner) to the full data extent.
    pub fn reset_chart(&self, index: usize) -> Result<(), CoreError> {
        self.chart_axis(index)?.reset();
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Rebuild the form so the slider ends at the current date.
    fn refresh_form(&mut self) {
        self.view.form = InputForm::new(&self.settings, chrono::Utc::now().date_naive());
    }

    fn charts(&self) -> Option<&ChartsView> {
        match &self.view.body {
            ViewBody::Charts(charts) => Some(charts),
            _ => None,
        }
    }

    fn chart_axis(&self, index: usize) -> Result<&XAxis, CoreError> {
        let charts = self
            .charts()
            .ok_or_else(|| CoreError::ValidationError("No charts are displayed".into()))?;
        charts
            .chart(index)
            .map(|chart| &chart.x_axis)
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "Chart index {index} out of range (0..{})",
                    charts.panels.len()
                ))
            })
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}
