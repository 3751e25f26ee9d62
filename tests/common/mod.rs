#![allow(dead_code)]

use tradesig::domain::error::TradesigError;
use tradesig::domain::price::PriceSample;
use tradesig::domain::rule::NormalizedRule;
use tradesig::domain::rule_parser;
use tradesig::ports::market_data_port::MarketDataPort;
use tradesig::ports::rule_source_port::RuleSourcePort;

pub struct MockMarketDataPort {
    pub samples: Vec<PriceSample>,
    pub error: Option<String>,
}

impl MockMarketDataPort {
    pub fn new(samples: Vec<PriceSample>) -> Self {
        Self {
            samples,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            samples: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn fetch_hourly(&self) -> Result<Vec<PriceSample>, TradesigError> {
        if let Some(reason) = &self.error {
            return Err(TradesigError::MarketData {
                reason: reason.clone(),
            });
        }
        Ok(self.samples.clone())
    }
}

pub struct MockRuleSource {
    pub rules: Vec<String>,
}

impl MockRuleSource {
    pub fn new(rules: &[&str]) -> Self {
        Self {
            rules: rules.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RuleSourcePort for MockRuleSource {
    fn load_rules(&self) -> Result<Vec<String>, TradesigError> {
        Ok(self.rules.clone())
    }
}

/// Hourly samples one hour apart, most-recent last.
pub fn hourly_series(prices: &[f64]) -> Vec<PriceSample> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PriceSample::new(1_700_000_000_000 + i as i64 * 3_600_000, p))
        .collect()
}

pub fn parse_all(texts: &[&str]) -> Vec<NormalizedRule> {
    texts
        .iter()
        .map(|t| rule_parser::parse(t).unwrap())
        .collect()
}
