//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod cryptocompare_adapter;
pub mod csv_price_adapter;
pub mod dataset_adapter;
pub mod rules_file_adapter;
pub mod json_output_adapter;
