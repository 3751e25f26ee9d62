//! Protected dataset adapter.
//!
//! The confidential dataset is a ZIP archive whose entries are borsh-encoded
//! values; entry paths come from dotted keys (`a.b` -> `a/b`). Rule strings
//! live either in a single `steps` entry (JSON array of strings, or one rule
//! per line) or in sequential `step1`, `step2`, ... entries.

use crate::domain::error::TradesigError;
use crate::ports::rule_source_port::RuleSourcePort;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub struct DatasetAdapter {
    archive_path: PathBuf,
}

/// Interprets a steps payload: a JSON array of strings if it parses as one,
/// otherwise the non-empty trimmed lines.
pub fn split_steps(raw: &str) -> Vec<String> {
    if let Ok(values) = serde_json::from_str::<Vec<String>>(raw) {
        return values;
    }
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl DatasetAdapter {
    pub fn new(archive_path: PathBuf) -> Self {
        Self { archive_path }
    }

    /// Resolves the archive location from the sandbox environment
    /// (`$IEXEC_IN/$IEXEC_DATASET_FILENAME`).
    pub fn from_env() -> Result<Self, TradesigError> {
        let input_dir = std::env::var("IEXEC_IN").map_err(|_| TradesigError::Dataset {
            reason: "IEXEC_IN is not set".to_string(),
        })?;
        let file_name =
            std::env::var("IEXEC_DATASET_FILENAME").map_err(|_| TradesigError::Dataset {
                reason: "missing protected data (IEXEC_DATASET_FILENAME is not set)".to_string(),
            })?;
        Ok(Self::new(Path::new(&input_dir).join(file_name)))
    }

    fn read_string_entry(&self, key: &str) -> Result<String, TradesigError> {
        let entry_path = key.replace('.', "/");

        let file = fs::File::open(&self.archive_path).map_err(|e| TradesigError::Dataset {
            reason: format!(
                "failed to open dataset {}: {}",
                self.archive_path.display(),
                e
            ),
        })?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| TradesigError::Dataset {
            reason: format!("not a readable ZIP archive: {}", e),
        })?;

        let mut entry = archive
            .by_name(&entry_path)
            .map_err(|_| TradesigError::Dataset {
                reason: format!("failed to load path {}", key),
            })?;
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| TradesigError::Dataset {
                reason: format!("failed to read entry {}: {}", key, e),
            })?;

        borsh::from_slice::<String>(&bytes).map_err(|_| TradesigError::Dataset {
            reason: format!("failed to deserialize \"{}\" as string", key),
        })
    }
}

impl RuleSourcePort for DatasetAdapter {
    fn load_rules(&self) -> Result<Vec<String>, TradesigError> {
        if let Ok(raw) = self.read_string_entry("steps") {
            let steps = split_steps(&raw);
            if !steps.is_empty() {
                return Ok(steps);
            }
        }

        // Legacy layout: one rule per sequential entry.
        let mut collected = Vec::new();
        let mut index = 1;
        while let Ok(raw) = self.read_string_entry(&format!("step{}", index)) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                break;
            }
            collected.push(trimmed.to_string());
            index += 1;
        }

        if collected.is_empty() {
            return Err(TradesigError::Dataset {
                reason: "no usable rule data found (neither 'steps' nor 'stepN')".to_string(),
            });
        }
        Ok(collected)
    }
}
