//! Result persistence port trait.

use crate::domain::error::TradesigError;
use crate::domain::report::{FailureReport, RunReport};
use std::path::PathBuf;

pub trait ResultSinkPort {
    /// Persists the run result, returning the path of the written record.
    fn write_report(&self, report: &RunReport) -> Result<PathBuf, TradesigError>;

    /// Persists a diagnostic record for an aborted run.
    fn write_failure(&self, failure: &FailureReport) -> Result<PathBuf, TradesigError>;
}
