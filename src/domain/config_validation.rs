//! Configuration validation.
//!
//! Every section is optional; absent keys fall back to their defaults.
//! Present keys must parse and lie in range.

use crate::domain::backtest::{DEFAULT_ALLOCATION, DEFAULT_INITIAL_CAPITAL};
use crate::domain::error::TickwiseError;
use crate::domain::signal::SignalConfig;
use crate::domain::trend::{DEFAULT_LEVELS, DEFAULT_LOOKBACK};
use crate::ports::config_port::ConfigPort;

pub const LOG_FORMATS: [&str; 2] = ["text", "json"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TickwiseError> {
    validate_backtest_section(config)?;
    validate_signals_section(config)?;
    validate_trend_section(config)?;
    validate_log_section(config)?;
    Ok(())
}

pub fn validate_backtest_section(config: &dyn ConfigPort) -> Result<(), TickwiseError> {
    let capital = number(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;
    if capital <= 0.0 {
        return Err(invalid("backtest", "initial_capital", "initial_capital must be positive"));
    }
    let allocation = number(config, "backtest", "allocation", DEFAULT_ALLOCATION)?;
    if allocation <= 0.0 || allocation > 1.0 {
        return Err(invalid("backtest", "allocation", "allocation must be in (0, 1]"));
    }
    Ok(())
}

/// Fraction to whole hundredths, the unit signal scores are kept in.
pub fn hundredths(fraction: f64) -> u32 {
    (fraction * 100.0).round() as u32
}

pub fn validate_signals_section(config: &dyn ConfigPort) -> Result<(), TickwiseError> {
    let defaults = SignalConfig::default();

    let threshold = number(
        config,
        "signals",
        "threshold",
        defaults.threshold_x100 as f64 / 100.0,
    )?;
    if threshold <= 0.0 || threshold > 1.0 {
        return Err(invalid("signals", "threshold", "threshold must be in (0, 1]"));
    }
    if hundredths(threshold) == 0 {
        return Err(invalid("signals", "threshold", "threshold must be at least 0.005"));
    }

    let oversold = number(config, "signals", "rsi_oversold", defaults.rsi_oversold)?;
    let overbought = number(config, "signals", "rsi_overbought", defaults.rsi_overbought)?;
    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid("signals", "rsi_oversold", "rsi_oversold must be in [0, 100]"));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid("signals", "rsi_overbought", "rsi_overbought must be in [0, 100]"));
    }
    if oversold >= overbought {
        return Err(invalid(
            "signals",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought",
        ));
    }

    let surge = number(config, "signals", "volume_surge", defaults.volume_surge)?;
    if surge <= 0.0 {
        return Err(invalid("signals", "volume_surge", "volume_surge must be positive"));
    }
    Ok(())
}

pub fn validate_trend_section(config: &dyn ConfigPort) -> Result<(), TickwiseError> {
    let lookback = integer(config, "trend", "lookback", DEFAULT_LOOKBACK as i64)?;
    if lookback < 1 {
        return Err(invalid("trend", "lookback", "lookback must be at least 1"));
    }
    let levels = integer(config, "trend", "levels", DEFAULT_LEVELS as i64)?;
    if levels < 1 {
        return Err(invalid("trend", "levels", "levels must be at least 1"));
    }
    Ok(())
}

pub fn validate_log_section(config: &dyn ConfigPort) -> Result<(), TickwiseError> {
    match config.get_string("log", "format") {
        Some(f) if !LOG_FORMATS.contains(&f.trim().to_lowercase().as_str()) => Err(invalid(
            "log",
            "format",
            "format must be one of: text, json",
        )),
        _ => Ok(()),
    }
}

/// Float value of `section.key`, `default` when absent. A present value
/// that does not parse is an error rather than a silent default.
pub fn number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TickwiseError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(section, key, &format!("{key} is not a number: {raw}"))),
    }
}

pub fn integer(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, TickwiseError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(section, key, &format!("{key} is not an integer: {raw}"))),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> TickwiseError {
    TickwiseError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
