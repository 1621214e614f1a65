//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first value, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Defined from the first bar; there is no warmup gap.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries::undefined(IndicatorType::Ema(period), bars);
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = ema_values(&closes, period).into_iter().map(Some).collect();
    IndicatorSeries::from_values(IndicatorType::Ema(period), bars, values)
}

/// Recursive EMA over raw values. `period` must be at least 1.
pub fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    let k = smoothing_factor(period);
    let mut out = Vec::with_capacity(values.len());

    for (i, &value) in values.iter().enumerate() {
        let ema = if i == 0 {
            value
        } else {
            value * k + out[i - 1] * (1.0 - k)
        };
        out.push(ema);
    }

    out
}

pub fn smoothing_factor(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}
