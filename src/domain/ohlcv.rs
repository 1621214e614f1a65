//! OHLCV bar representation and bar-sequence validation.

use crate::domain::error::InputError;
use chrono::NaiveDate;

/// One trading day of price history.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Checks that a bar sequence is non-empty, strictly increasing by date and
/// carries only positive finite prices.
pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), InputError> {
    if bars.is_empty() {
        return Err(InputError::Empty);
    }

    for (index, bar) in bars.iter().enumerate() {
        for (field, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(InputError::NonPositivePrice {
                    index,
                    field,
                    value,
                });
            }
        }

        if index > 0 {
            let previous = bars[index - 1].date;
            if bar.date <= previous {
                return Err(InputError::NonMonotonicDates {
                    index,
                    previous,
                    current: bar.date,
                });
            }
        }
    }

    Ok(())
}

pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
