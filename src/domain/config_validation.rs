//! Configuration validation.
//!
//! Validates all config fields before any data is fetched.

use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;

pub fn validate_screener_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_symbol_sources(config)?;
    validate_validation_thresholds(config)?;
    validate_lookback(config)?;
    validate_request_delays(config)?;
    validate_momentum(config)?;
    validate_value(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_symbol_sources(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let include_index = config.get_bool("symbol_sources", "sp500", false);
    let custom = config.get_list("symbol_sources", "custom_symbols");
    if !include_index && custom.is_empty() {
        return Err(ScreenerError::ConfigMissing {
            section: "symbol_sources".to_string(),
            key: "custom_symbols".to_string(),
        });
    }
    Ok(())
}

fn validate_validation_thresholds(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    for key in ["min_market_cap", "min_avg_volume", "min_price_threshold"] {
        if config.get_double("validation", key, 0.0) < 0.0 {
            return Err(invalid(
                "validation",
                key,
                &format!("{} must be non-negative", key),
            ));
        }
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if config.get_int("validation", "lookback_days", 730) <= 0 {
        return Err(invalid(
            "validation",
            "lookback_days",
            "lookback_days must be positive",
        ));
    }
    Ok(())
}

fn validate_request_delays(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    for section in ["validation", "screening"] {
        if config.get_int(section, "request_delay_ms", 0) < 0 {
            return Err(invalid(
                section,
                "request_delay_ms",
                "request_delay_ms must be non-negative",
            ));
        }
    }
    Ok(())
}

fn validate_momentum(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let ratio = config.get_double("momentum", "min_volume_ratio", 0.8);
    if ratio < 0.0 {
        return Err(invalid(
            "momentum",
            "min_volume_ratio",
            "min_volume_ratio must be non-negative",
        ));
    }
    let min_return = config.get_double("momentum", "min_return_3m", 0.05);
    if !min_return.is_finite() || min_return <= -1.0 {
        return Err(invalid(
            "momentum",
            "min_return_3m",
            "min_return_3m must be greater than -1",
        ));
    }
    Ok(())
}

fn validate_value(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if config.get_double("value", "max_pe", 20.0) <= 0.0 {
        return Err(invalid("value", "max_pe", "max_pe must be positive"));
    }
    let yield_min = config.get_double("value", "min_dividend_yield", 0.02);
    if !(0.0..1.0).contains(&yield_min) {
        return Err(invalid(
            "value",
            "min_dividend_yield",
            "min_dividend_yield must be between 0 and 1",
        ));
    }
    Ok(())
}
