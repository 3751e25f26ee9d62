//! CryptoCompare hourly price adapter.
//!
//! One blocking GET of the histohour endpoint with a timeout; no retries,
//! no paging. Candles map to (time * 1000, close) and only the trailing
//! `lookback_hours` samples are kept.

use crate::domain::error::TradesigError;
use crate::domain::price::{PriceSample, MIN_PRICE_SAMPLES};
use crate::domain::run::RunConfig;
use crate::ports::market_data_port::MarketDataPort;
use serde::Deserialize;
use std::time::Duration;

pub struct CryptoCompareAdapter {
    endpoint: String,
    lookback_hours: usize,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct HistoResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "Data", default)]
    data: Option<HistoData>,
}

#[derive(Debug, Deserialize)]
struct HistoData {
    #[serde(rename = "Data", default)]
    candles: Vec<Candle>,
}

#[derive(Debug, Deserialize)]
struct Candle {
    time: i64,
    // Candles without a close are dropped rather than failing the batch.
    close: Option<f64>,
}

impl CryptoCompareAdapter {
    pub fn from_config(config: &RunConfig) -> Result<Self, TradesigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("tradesig/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TradesigError::MarketData {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            lookback_hours: config.lookback_hours,
            client,
        })
    }
}

impl MarketDataPort for CryptoCompareAdapter {
    fn fetch_hourly(&self) -> Result<Vec<PriceSample>, TradesigError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(|e| TradesigError::MarketData {
                reason: format!("request to {} failed: {e}", self.endpoint),
            })?
            .error_for_status()
            .map_err(|e| TradesigError::MarketData {
                reason: format!("HTTP error from {}: {e}", self.endpoint),
            })?;

        let payload: HistoResponse = response.json().map_err(|e| TradesigError::MarketData {
            reason: format!("unexpected response format: {e}"),
        })?;

        samples_from_response(payload, self.lookback_hours)
    }
}

fn samples_from_response(
    payload: HistoResponse,
    lookback_hours: usize,
) -> Result<Vec<PriceSample>, TradesigError> {
    if payload.response != "Success" {
        return Err(TradesigError::MarketData {
            reason: format!(
                "CryptoCompare error: {}",
                payload.message.as_deref().unwrap_or("unknown")
            ),
        });
    }

    let candles = payload.data.map(|d| d.candles).unwrap_or_default();
    let mut prices: Vec<PriceSample> = candles
        .into_iter()
        .filter_map(|c| c.close.map(|close| PriceSample::new(c.time * 1000, close)))
        .collect();

    if prices.len() < MIN_PRICE_SAMPLES {
        return Err(TradesigError::InsufficientData {
            samples: prices.len(),
            minimum: MIN_PRICE_SAMPLES,
        });
    }

    if prices.len() > lookback_hours {
        let excess = prices.len() - lookback_hours;
        prices.drain(..excess);
    }
    Ok(prices)
}
