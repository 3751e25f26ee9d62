//! Persisted result records.
//!
//! The field names here are the output contract: downstream consumers read
//! `result.json` by these exact keys.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::TradesigError;
use crate::domain::rule_eval::Decision;
use crate::domain::run::RunConfig;

pub const IAPP_NAME: &str = "strategy-executor-btc";
pub const IAPP_VERSION: u32 = 1;

pub const ACCEPTED_FORMATS: [&str; 3] = [
    "ACTION if pct_change Wh >= X% then P%",
    "ACTION if pct_change Wh <= X% then P%",
    "ACTION if pct_change Wh in [A%, B%] then P%",
];

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub action: crate::domain::rule::Action,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Audit {
    pub rule_count: usize,
    pub max_position_percent: f64,
    pub accepted_formats: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub iapp: &'static str,
    pub version: u32,
    pub timestamp_utc: String,
    pub market: String,
    pub data_source: String,
    pub lookback_hours: usize,
    pub latest_price: f64,
    pub recommendation: Recommendation,
    pub matched_rule: Option<String>,
    pub indicator_value_pct: Option<f64>,
    pub explanations: Vec<String>,
    pub audit: Audit,
}

impl RunReport {
    pub fn build(
        decision: Decision,
        latest_price: f64,
        sample_count: usize,
        rule_count: usize,
        config: &RunConfig,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            iapp: IAPP_NAME,
            version: IAPP_VERSION,
            timestamp_utc: timestamp.to_rfc3339(),
            market: config.market.clone(),
            data_source: config.data_source.clone(),
            lookback_hours: sample_count.min(config.lookback_hours),
            latest_price,
            recommendation: Recommendation {
                action: decision.action,
                percent: decision.percent,
            },
            matched_rule: decision.matched_rule,
            indicator_value_pct: decision.indicator_value_pct,
            explanations: decision.explanations,
            audit: Audit {
                rule_count,
                max_position_percent: config.max_position_percent,
                accepted_formats: ACCEPTED_FORMATS.to_vec(),
            },
        }
    }
}

/// Best-effort diagnostic written when a run aborts, so the caller always
/// gets machine-readable output even on failure.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub iapp: &'static str,
    pub version: u32,
    pub timestamp_utc: String,
    pub error: String,
}

impl FailureReport {
    pub fn from_error(err: &TradesigError, timestamp: DateTime<Utc>) -> Self {
        Self {
            iapp: IAPP_NAME,
            version: IAPP_VERSION,
            timestamp_utc: timestamp.to_rfc3339(),
            error: format!("{}: {}", err.kind(), err),
        }
    }
}
