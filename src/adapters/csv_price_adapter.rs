//! CSV price file adapter.
//!
//! Offline/replay source: `timestamp_ms,price` rows with a header, sorted
//! ascending before being returned.

use crate::domain::error::TradesigError;
use crate::domain::price::{PriceSample, MIN_PRICE_SAMPLES};
use crate::ports::market_data_port::MarketDataPort;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl MarketDataPort for CsvPriceAdapter {
    fn fetch_hourly(&self) -> Result<Vec<PriceSample>, TradesigError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TradesigError::MarketData {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut samples = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TradesigError::MarketData {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp_ms: i64 = record
                .get(0)
                .ok_or_else(|| TradesigError::MarketData {
                    reason: "missing timestamp_ms column".into(),
                })?
                .trim()
                .parse()
                .map_err(|e| TradesigError::MarketData {
                    reason: format!("invalid timestamp_ms value: {}", e),
                })?;

            let price: f64 = record
                .get(1)
                .ok_or_else(|| TradesigError::MarketData {
                    reason: "missing price column".into(),
                })?
                .trim()
                .parse()
                .map_err(|e| TradesigError::MarketData {
                    reason: format!("invalid price value: {}", e),
                })?;

            samples.push(PriceSample::new(timestamp_ms, price));
        }

        samples.sort_by_key(|s| s.timestamp_ms);

        if samples.len() < MIN_PRICE_SAMPLES {
            return Err(TradesigError::InsufficientData {
                samples: samples.len(),
                minimum: MIN_PRICE_SAMPLES,
            });
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("prices.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_samples_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "timestamp_ms,price\n\
             1700000000000,64000.0\n\
             1700003600000,64500.0\n\
             1700007200000,64250.5\n",
        );

        let samples = CsvPriceAdapter::new(path).fetch_hourly().unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].timestamp_ms, 1_700_000_000_000);
        assert_eq!(samples[2].price, 64_250.5);
    }

    #[test]
    fn sorts_out_of_order_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "timestamp_ms,price\n\
             1700007200000,64250.0\n\
             1700000000000,64000.0\n\
             1700003600000,64500.0\n",
        );

        let samples = CsvPriceAdapter::new(path).fetch_hourly().unwrap();

        assert_eq!(samples[0].timestamp_ms, 1_700_000_000_000);
        assert_eq!(samples[2].timestamp_ms, 1_700_007_200_000);
    }

    #[test]
    fn missing_file_is_market_data_error() {
        let adapter = CsvPriceAdapter::new(PathBuf::from("/nonexistent/prices.csv"));
        let err = adapter.fetch_hourly().unwrap_err();
        assert!(matches!(err, TradesigError::MarketData { .. }));
    }

    #[test]
    fn non_numeric_price_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "timestamp_ms,price\n1700000000000,lots\n");
        let err = CsvPriceAdapter::new(path).fetch_hourly().unwrap_err();
        assert!(err.to_string().contains("invalid price"));
    }

    #[test]
    fn single_row_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "timestamp_ms,price\n1700000000000,64000.0\n");
        let err = CsvPriceAdapter::new(path).fetch_hourly().unwrap_err();
        assert!(matches!(
            err,
            TradesigError::InsufficientData { samples: 1, .. }
        ));
    }

    #[test]
    fn header_only_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "timestamp_ms,price\n");
        let err = CsvPriceAdapter::new(path).fetch_hourly().unwrap_err();
        assert!(matches!(
            err,
            TradesigError::InsufficientData { samples: 0, .. }
        ));
    }
}
