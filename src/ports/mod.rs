//! Port traits connecting the domain to its collaborators.

pub mod config_port;
pub mod market_data_port;
pub mod rule_source_port;
pub mod result_sink_port;
