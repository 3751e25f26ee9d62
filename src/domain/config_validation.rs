//! Run configuration validation.
//!
//! Validates all fields before any network or dataset access happens.

use crate::domain::error::TradesigError;
use crate::domain::run::RunConfig;

pub fn validate_run_config(config: &RunConfig) -> Result<(), TradesigError> {
    validate_max_position_percent(config)?;
    validate_lookback_hours(config)?;
    validate_timeout(config)?;
    validate_endpoint(config)?;
    Ok(())
}

fn validate_max_position_percent(config: &RunConfig) -> Result<(), TradesigError> {
    if !config.max_position_percent.is_finite() || config.max_position_percent < 0.0 {
        return Err(TradesigError::ConfigInvalid {
            section: "run".to_string(),
            key: "max_position_percent".to_string(),
            reason: "max_position_percent must be a non-negative number".to_string(),
        });
    }
    Ok(())
}

fn validate_lookback_hours(config: &RunConfig) -> Result<(), TradesigError> {
    if config.lookback_hours < 2 {
        return Err(TradesigError::ConfigInvalid {
            section: "market".to_string(),
            key: "lookback_hours".to_string(),
            reason: "lookback_hours must be at least 2".to_string(),
        });
    }
    Ok(())
}

fn validate_timeout(config: &RunConfig) -> Result<(), TradesigError> {
    if config.timeout_secs == 0 {
        return Err(TradesigError::ConfigInvalid {
            section: "market".to_string(),
            key: "timeout_secs".to_string(),
            reason: "timeout_secs must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_endpoint(config: &RunConfig) -> Result<(), TradesigError> {
    if config.endpoint.trim().is_empty() {
        return Err(TradesigError::ConfigMissing {
            section: "market".to_string(),
            key: "endpoint".to_string(),
        });
    }
    Ok(())
}
