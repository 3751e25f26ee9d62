//! Plain-file rule source.
//!
//! Same payload interpretation as the dataset `steps` entry: a JSON array of
//! strings, or one rule per line. Used by local runs and `validate-rules`.

use crate::adapters::dataset_adapter::split_steps;
use crate::domain::error::TradesigError;
use crate::ports::rule_source_port::RuleSourcePort;
use std::fs;
use std::path::PathBuf;

pub struct RulesFileAdapter {
    path: PathBuf,
}

impl RulesFileAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RuleSourcePort for RulesFileAdapter {
    fn load_rules(&self) -> Result<Vec<String>, TradesigError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| TradesigError::Dataset {
            reason: format!("failed to read rules file {}: {}", self.path.display(), e),
        })?;

        let rules = split_steps(&raw);
        if rules.is_empty() {
            return Err(TradesigError::Dataset {
                reason: format!("rules file {} contains no rules", self.path.display()),
            });
        }
        Ok(rules)
    }
}
