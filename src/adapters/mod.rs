//! Concrete implementations of the port traits.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_report_adapter;
pub mod json_strategy_adapter;
pub mod synthetic_adapter;
