//! JSON output-directory adapter.
//!
//! Writes `result.json` (pretty-printed record) plus a `computed.json`
//! manifest pointing at it. Failure records go through the same pair; if the
//! record itself cannot be written, a bare manifest carrying the error text
//! is the fallback so the sandbox always finds deterministic output.

use crate::domain::error::TradesigError;
use crate::domain::report::{FailureReport, RunReport};
use crate::ports::result_sink_port::ResultSinkPort;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const RESULT_FILE: &str = "result.json";
pub const MANIFEST_FILE: &str = "computed.json";

pub struct JsonOutputAdapter {
    output_dir: PathBuf,
}

impl JsonOutputAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    fn write_record<T: Serialize>(&self, record: &T) -> Result<PathBuf, TradesigError> {
        fs::create_dir_all(&self.output_dir)?;

        let result_path = self.output_dir.join(RESULT_FILE);
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| TradesigError::Io(std::io::Error::other(e)))?;
        fs::write(&result_path, json)?;

        self.write_manifest(&result_path, None)?;
        Ok(result_path)
    }

    fn write_manifest(&self, target: &Path, error: Option<&str>) -> Result<(), TradesigError> {
        let mut manifest = serde_json::json!({
            "deterministic-output-path": target.display().to_string(),
        });
        if let Some(error) = error {
            manifest["error"] = serde_json::Value::String(error.to_string());
        }
        let json = serde_json::to_string(&manifest)
            .map_err(|e| TradesigError::Io(std::io::Error::other(e)))?;
        fs::write(self.output_dir.join(MANIFEST_FILE), json)?;
        Ok(())
    }
}

impl ResultSinkPort for JsonOutputAdapter {
    fn write_report(&self, report: &RunReport) -> Result<PathBuf, TradesigError> {
        self.write_record(report)
    }

    fn write_failure(&self, failure: &FailureReport) -> Result<PathBuf, TradesigError> {
        match self.write_record(failure) {
            Ok(path) => Ok(path),
            Err(_) => {
                // Last resort: manifest-only output with the error inline.
                fs::create_dir_all(&self.output_dir)?;
                self.write_manifest(&self.output_dir, Some(&failure.error))?;
                Ok(self.output_dir.join(MANIFEST_FILE))
            }
        }
    }
}
