pub mod chart_service;
pub mod data_loader;
pub mod indicator_service;
