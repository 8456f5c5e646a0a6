//! Ticker Dashboard command-line frontend.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use logging::setup_logging;
use ticker_dashboard_core::models::ohlc::date_to_epoch_ms;
use ticker_dashboard_core::models::settings::Settings;
use ticker_dashboard_core::models::view::{ViewBody, TICKER_SLOTS};
use ticker_dashboard_core::{Dashboard, SubmitRequest};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_str(), cli.json_logs);

    let mut settings = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            Settings::from_json(&json)?
        }
        None => Settings::default(),
    };
    if let Some(key) = &cli.alphavantage_key {
        settings.api_keys.insert("alphavantage".into(), key.clone());
    }

    let mut tickers: [String; TICKER_SLOTS] = Default::default();
    for (slot, ticker) in tickers.iter_mut().zip(&cli.tickers) {
        slot.clone_from(ticker);
    }

    let to = cli.to.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let request = SubmitRequest {
        tickers,
        start_epoch_ms: date_to_epoch_ms(cli.from),
        end_epoch_ms: date_to_epoch_ms(to),
        indicators: cli.indicators.clone(),
    };

    let mut dashboard = Dashboard::with_settings(settings);
    info!(providers = ?dashboard.provider_names(), tickers = ?request.tickers, %to, "Submitting");
    let view = dashboard.on_submit(request).await;
    let failed = match &view.body {
        ViewBody::Error(panel) => {
            error!(message = %panel.message, "Submission failed");
            true
        }
        ViewBody::Charts(charts) => {
            info!(charts = charts.panels.len(), notices = charts.notices.len(), "Submission rendered");
            false
        }
        ViewBody::Empty => false,
    };

    let json = if cli.pretty {
        dashboard.view_json()?
    } else {
        serde_json::to_string(dashboard.view())?
    };
    println!("{json}");

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
