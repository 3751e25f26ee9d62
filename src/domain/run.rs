//! Run configuration for a single evaluation pass.

use std::path::PathBuf;

pub const DEFAULT_MAX_POSITION_PERCENT: f64 = 50.0;
pub const DEFAULT_LOOKBACK_HOURS: usize = 24;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_OUTPUT_DIR: &str = "/iexec_out";
pub const DEFAULT_ENDPOINT: &str =
    "https://min-api.cryptocompare.com/data/v2/histohour?fsym=BTC&tsym=USD&limit=24";
pub const DEFAULT_DATA_SOURCE: &str = "CryptoCompare /data/v2/histohour?fsym=BTC&tsym=USD&limit=24";

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Ceiling any single recommendation may instruct (BUY/SELL percent).
    pub max_position_percent: f64,
    /// Number of trailing hourly samples kept from the market feed.
    pub lookback_hours: usize,
    pub market: String,
    /// Label recorded in the result for auditability.
    pub data_source: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
    /// Explicit dataset archive location; when unset the sandbox environment
    /// decides (`$IEXEC_IN/$IEXEC_DATASET_FILENAME`).
    pub dataset_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_position_percent: DEFAULT_MAX_POSITION_PERCENT,
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            market: "BTC-USD".to_string(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dataset_path: None,
        }
    }
}
