//! CLI definitions.

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ticker-dashboard")]
#[command(author, version, about = "Four synchronized candlestick charts from daily market data")]
pub struct Cli {
    /// Ticker symbols, one to four (missing slots are submitted empty)
    #[arg(required = true, num_args = 1..=4)]
    pub tickers: Vec<String>,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day of the range (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Indicator to overlay, by name or id (e.g. "SMA-30", "Linear-Trend"); repeatable
    #[arg(short, long = "indicator")]
    pub indicators: Vec<String>,

    /// Settings file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Alpha Vantage API key, enables the fallback provider
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub alphavantage_key: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Pretty-print the view JSON
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
