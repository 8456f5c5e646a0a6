pub mod chart;
pub mod indicator;
pub mod ohlc;
pub mod settings;
pub mod view;
