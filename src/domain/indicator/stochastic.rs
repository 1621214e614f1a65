//! Slow stochastic oscillator.
//!
//! raw %K[i] = 100 * (C[i] - LL) / (HH - LL) over the last `period` bars
//! %K = SMA(smooth) of raw %K
//! %D = SMA(smooth) of %K
//!
//! A flat window (HH == LL) has no raw %K; every smoothing window that touches
//! it is undefined as well.
//! Warmup: %K needs period + smooth - 2 bars, %D another smooth - 1.

use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_SMOOTH: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticOutput {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

pub fn calculate_stochastic(bars: &[OhlcvBar], period: usize, smooth: usize) -> StochasticOutput {
    let k_type = IndicatorType::StochasticK { period, smooth };
    let d_type = IndicatorType::StochasticD { period, smooth };

    let raw = raw_k_values(bars, period);
    let k = rolling_mean(&raw, smooth);
    let d = rolling_mean(&k, smooth);

    StochasticOutput {
        k: IndicatorSeries::from_values(k_type, bars, k),
        d: IndicatorSeries::from_values(d_type, bars, d),
    }
}

/// Unsmoothed (fast) %K.
pub fn raw_k_values(bars: &[OhlcvBar], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; bars.len()];
    }

    (0..bars.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let range = highest - lowest;
            if range == 0.0 {
                None
            } else {
                Some(100.0 * (bars[i].close - lowest) / range)
            }
        })
        .collect()
}
