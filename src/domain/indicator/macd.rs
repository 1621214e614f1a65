//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! All three EMAs are seeded with their first input, so every output is defined
//! from the first bar.

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdOutput {
    let line_type = IndicatorType::MacdLine {
        fast,
        slow,
        signal: signal_period,
    };
    let signal_type = IndicatorType::MacdSignal {
        fast,
        slow,
        signal: signal_period,
    };
    let histogram_type = IndicatorType::MacdHistogram {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdOutput {
            line: IndicatorSeries::undefined(line_type, bars),
            signal: IndicatorSeries::undefined(signal_type, bars),
            histogram: IndicatorSeries::undefined(histogram_type, bars),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal_period);
    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdOutput {
        line: IndicatorSeries::from_values(line_type, bars, defined(macd_line)),
        signal: IndicatorSeries::from_values(signal_type, bars, defined(signal_line)),
        histogram: IndicatorSeries::from_values(histogram_type, bars, defined(histogram)),
    }
}

fn defined(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(Some).collect()
}
