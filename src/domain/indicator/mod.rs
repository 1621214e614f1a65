//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single dated point, `None` while the indicator is warming up
//! - `IndicatorType`: Indicator identity + parameters
//! - `IndicatorSeries`: A series aligned index-for-index with the input bars
//!
//! Each submodule exposes a slice-level function working on raw numbers and a
//! `calculate_*` wrapper that attaches bar dates.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdOutput};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{calculate_stochastic, StochasticOutput};

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    MacdLine {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    MacdHistogram {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    StochasticK {
        period: usize,
        smooth: usize,
    },
    StochasticD {
        period: usize,
        smooth: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Pairs raw values with the dates of `bars`. Both must have the same length.
    pub fn from_values(
        indicator_type: IndicatorType,
        bars: &[OhlcvBar],
        values: Vec<Option<f64>>,
    ) -> Self {
        debug_assert_eq!(bars.len(), values.len());
        let points = bars
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint {
                date: bar.date,
                value,
            })
            .collect();
        Self {
            indicator_type,
            points,
        }
    }

    /// A series of the same length as `bars` with every value undefined.
    pub fn undefined(indicator_type: IndicatorType, bars: &[OhlcvBar]) -> Self {
        Self::from_values(indicator_type, bars, vec![None; bars.len()])
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.points.get(index).and_then(|p| p.value)
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.value)
    }

    /// Number of leading undefined values.
    pub fn warmup_len(&self) -> usize {
        self.points.iter().take_while(|p| p.value.is_none()).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::MacdLine { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::MacdSignal { fast, slow, signal } => {
                write!(f, "MACD_SIGNAL({},{},{})", fast, slow, signal)
            }
            IndicatorType::MacdHistogram { fast, slow, signal } => {
                write!(f, "MACD_HIST({},{},{})", fast, slow, signal)
            }
            IndicatorType::StochasticK { period, smooth } => {
                write!(f, "STOCH_K({},{})", period, smooth)
            }
            IndicatorType::StochasticD { period, smooth } => {
                write!(f, "STOCH_D({},{})", period, smooth)
            }
        }
    }
}
