//! Entry/exit signal generation from indicator comparisons.
//!
//! Signals are per-bar level conditions. An undefined operand on either side of a
//! comparison yields `false`, never an undefined signal.

use crate::domain::engine::IndicatorSet;
use crate::domain::error::InputError;
use crate::domain::indicator::IndicatorSeries;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RSI_LOWER: f64 = 30.0;
pub const DEFAULT_RSI_UPPER: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalStrategy {
    /// Long while the MACD line is above its signal line.
    MacdCross,
    /// Enter when RSI drops below `lower`, exit when it rises above `upper`.
    RsiThreshold { lower: f64, upper: f64 },
    /// Long while %K is above %D.
    StochasticCross,
}

impl SignalStrategy {
    pub fn rsi_default() -> Self {
        SignalStrategy::RsiThreshold {
            lower: DEFAULT_RSI_LOWER,
            upper: DEFAULT_RSI_UPPER,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SignalStrategy::MacdCross => "macd",
            SignalStrategy::RsiThreshold { .. } => "rsi",
            SignalStrategy::StochasticCross => "stochastic",
        }
    }
}

impl fmt::Display for SignalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStrategy::MacdCross => write!(f, "MACD cross"),
            SignalStrategy::RsiThreshold { lower, upper } => {
                write!(f, "RSI threshold ({}/{})", lower, upper)
            }
            SignalStrategy::StochasticCross => write!(f, "Stochastic %K/%D cross"),
        }
    }
}

impl FromStr for SignalStrategy {
    type Err = String;

    /// Parses a strategy kind; RSI thresholds take their defaults.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macd" => Ok(SignalStrategy::MacdCross),
            "rsi" => Ok(SignalStrategy::rsi_default()),
            "stochastic" | "stoch" | "kd" => Ok(SignalStrategy::StochasticCross),
            other => Err(format!(
                "unknown strategy '{}' (expected macd, rsi or stochastic)",
                other
            )),
        }
    }
}

/// Entry and exit flags aligned with the bar sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalPair {
    pub entry: Vec<bool>,
    pub exit: Vec<bool>,
}

impl SignalPair {
    pub fn len(&self) -> usize {
        self.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }
}

pub fn generate_signals(
    strategy: &SignalStrategy,
    indicators: &IndicatorSet,
) -> Result<SignalPair, InputError> {
    match *strategy {
        SignalStrategy::MacdCross => {
            crossover_signals(&indicators.macd.line, &indicators.macd.signal)
        }
        SignalStrategy::RsiThreshold { lower, upper } => {
            let rsi = indicators.rsi.values();
            Ok(SignalPair {
                entry: below_threshold(&rsi, lower),
                exit: above_threshold(&rsi, upper),
            })
        }
        SignalStrategy::StochasticCross => {
            crossover_signals(&indicators.stochastic.k, &indicators.stochastic.d)
        }
    }
}

/// Signals from two arbitrary aligned series: entry where `fast` is above `slow`,
/// exit where it is below.
pub fn crossover_signals(
    fast: &IndicatorSeries,
    slow: &IndicatorSeries,
) -> Result<SignalPair, InputError> {
    let fast = fast.values();
    let slow = slow.values();
    Ok(SignalPair {
        entry: above(&fast, &slow)?,
        exit: below(&fast, &slow)?,
    })
}

pub fn above(left: &[Option<f64>], right: &[Option<f64>]) -> Result<Vec<bool>, InputError> {
    compare(left, right, |l, r| l > r)
}

pub fn below(left: &[Option<f64>], right: &[Option<f64>]) -> Result<Vec<bool>, InputError> {
    compare(left, right, |l, r| l < r)
}

pub fn above_threshold(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    values
        .iter()
        .map(|v| v.is_some_and(|x| x > threshold))
        .collect()
}

pub fn below_threshold(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    values
        .iter()
        .map(|v| v.is_some_and(|x| x < threshold))
        .collect()
}

fn compare(
    left: &[Option<f64>],
    right: &[Option<f64>],
    op: impl Fn(f64, f64) -> bool,
) -> Result<Vec<bool>, InputError> {
    if left.len() != right.len() {
        return Err(InputError::LengthMismatch {
            what: "comparison operand",
            expected: left.len(),
            actual: right.len(),
        });
    }

    Ok(left
        .iter()
        .zip(right)
        .map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) => op(*l, *r),
            _ => false,
        })
        .collect())
}
