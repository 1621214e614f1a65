//! Configuration validation.
//!
//! Validates all config fields before any data is loaded.

use crate::domain::error::StockboardError;
use crate::domain::lookback::Lookback;
use crate::domain::signal::{SignalStrategy, DEFAULT_RSI_LOWER, DEFAULT_RSI_UPPER};
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockboardError> {
    validate_data_config(config)?;
    validate_indicator_config(config)?;
    validate_strategy_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StockboardError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => {}
        _ => {
            return Err(StockboardError::ConfigMissing {
                section: "data".to_string(),
                key: "dir".to_string(),
            })
        }
    }

    if let Some(lookback) = config.get_string("data", "lookback") {
        lookback
            .parse::<Lookback>()
            .map_err(|reason| invalid("data", "lookback", reason))?;
    }
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), StockboardError> {
    if let Some(windows) = config.get_string("indicators", "sma_windows") {
        parse_windows(&windows).map_err(|reason| invalid("indicators", "sma_windows", reason))?;
    }
    if let Some(windows) = config.get_string("indicators", "ema_windows") {
        parse_windows(&windows).map_err(|reason| invalid("indicators", "ema_windows", reason))?;
    }

    for key in [
        "macd_fast",
        "macd_slow",
        "macd_signal",
        "rsi_period",
        "stoch_period",
        "stoch_smooth",
    ] {
        validate_period(config, key)?;
    }

    let fast = config.get_int("indicators", "macd_fast", 12);
    let slow = config.get_int("indicators", "macd_slow", 26);
    if fast >= slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            format!("macd_fast ({}) must be less than macd_slow ({})", fast, slow),
        ));
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), StockboardError> {
    if let Some(kind) = config.get_string("strategy", "kind") {
        kind.parse::<SignalStrategy>()
            .map_err(|reason| invalid("strategy", "kind", reason))?;
    }

    let lower = validate_threshold(config, "rsi_lower", DEFAULT_RSI_LOWER)?;
    let upper = validate_threshold(config, "rsi_upper", DEFAULT_RSI_UPPER)?;
    if lower >= upper {
        return Err(invalid(
            "strategy",
            "rsi_lower",
            "rsi_lower must be less than rsi_upper".to_string(),
        ));
    }
    Ok(())
}

/// Reads an RSI bound from `[strategy]`, falling back to `default` only when the
/// key is absent.
pub fn validate_threshold(
    config: &dyn ConfigPort,
    key: &str,
    default: f64,
) -> Result<f64, StockboardError> {
    let Some(raw) = config.get_string("strategy", key) else {
        return Ok(default);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("strategy", key, format!("'{}' is not a number", raw.trim())))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(invalid(
            "strategy",
            key,
            format!("{} must be between 0 and 100", key),
        ));
    }
    Ok(value)
}

/// Parses a comma-separated list of positive window lengths.
pub fn parse_windows(value: &str) -> Result<Vec<usize>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(0) => Err("window must be at least 1".to_string()),
            Ok(w) => Ok(w),
            Err(_) => Err(format!("'{}' is not a window length", s)),
        })
        .collect()
}

fn validate_period(config: &dyn ConfigPort, key: &str) -> Result<(), StockboardError> {
    let Some(raw) = config.get_string("indicators", key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 1 => Ok(()),
        Ok(_) => Err(invalid(
            "indicators",
            key,
            format!("{} must be at least 1", key),
        )),
        Err(_) => Err(invalid(
            "indicators",
            key,
            format!("{} must be an integer", key),
        )),
    }
}

fn invalid(section: &str, key: &str, reason: String) -> StockboardError {
    StockboardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const VALID: &str = r#"
[data]
dir = ./data
ticker = 0050.TW
lookback = 3y

[indicators]
sma_windows = 20, 60, 120, 240
macd_fast = 12
macd_slow = 26
macd_signal = 9
rsi_period = 14
stoch_period = 14
stoch_smooth = 3

[strategy]
kind = rsi
rsi_lower = 25
rsi_upper = 75
"#;

    #[test]
    fn valid_config_passes() {
        assert!(validate_config(&config(VALID)).is_ok());
    }

    #[test]
    fn minimal_config_uses_defaults() {
        assert!(validate_config(&config("[data]\ndir = /tmp\n")).is_ok());
    }

    #[test]
    fn missing_data_dir() {
        let err = validate_config(&config("[data]\nticker = AAPL\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigMissing { key, .. } if key == "dir"));
    }

    #[test]
    fn unknown_lookback() {
        let err = validate_data_config(&config("[data]\ndir = d\nlookback = 2w\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "lookback"));
    }

    #[test]
    fn zero_sma_window() {
        let err =
            validate_indicator_config(&config("[indicators]\nsma_windows = 20,0\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "sma_windows"));
    }

    #[test]
    fn non_numeric_period() {
        let err =
            validate_indicator_config(&config("[indicators]\nrsi_period = fast\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "rsi_period"));
    }

    #[test]
    fn negative_period() {
        let err =
            validate_indicator_config(&config("[indicators]\nstoch_smooth = -3\n")).unwrap_err();
        assert!(
            matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "stoch_smooth")
        );
    }

    #[test]
    fn fast_not_below_slow() {
        let err = validate_indicator_config(&config(
            "[indicators]\nmacd_fast = 26\nmacd_slow = 12\n",
        ))
        .unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "macd_fast"));
    }

    #[test]
    fn unknown_strategy() {
        let err = validate_strategy_config(&config("[strategy]\nkind = momentum\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn rsi_band_out_of_range() {
        let err =
            validate_strategy_config(&config("[strategy]\nrsi_upper = 120\n")).unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "rsi_upper"));
    }

    #[test]
    fn rsi_band_inverted() {
        let err = validate_strategy_config(&config(
            "[strategy]\nrsi_lower = 70\nrsi_upper = 30\n",
        ))
        .unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "rsi_lower"));
    }

    #[test]
    fn malformed_rsi_bounds_rejected() {
        let err = validate_config(&config(
            "[data]\ndir = d\n\n[strategy]\nkind = rsi\nrsi_lower = 2O\nrsi_upper = 7O\n",
        ))
        .unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "rsi_lower"));

        let err = validate_strategy_config(&config("[strategy]\nrsi_upper = seventy\n"))
            .unwrap_err();
        assert!(matches!(err, StockboardError::ConfigInvalid { key, .. } if key == "rsi_upper"));
    }

    #[test]
    fn threshold_defaults_only_when_absent() {
        let cfg = config("[strategy]\nrsi_lower = 27.5\n");
        assert_eq!(validate_threshold(&cfg, "rsi_lower", 30.0).unwrap(), 27.5);
        assert_eq!(validate_threshold(&cfg, "rsi_upper", 70.0).unwrap(), 70.0);
    }

    #[test]
    fn parse_windows_list() {
        assert_eq!(parse_windows("20, 60,120 ,240").unwrap(), vec![20, 60, 120, 240]);
        assert_eq!(parse_windows("").unwrap(), Vec::<usize>::new());
        assert!(parse_windows("20,x").is_err());
        assert!(parse_windows("0").is_err());
    }
}
