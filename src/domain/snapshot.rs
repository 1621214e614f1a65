//! Latest-bar summary for the dashboard's metric tiles.

use crate::domain::engine::IndicatorSet;
use crate::domain::error::InputError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub close_change: Option<f64>,
    pub volume: u64,
    pub volume_change: Option<i128>,
    pub rsi: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

impl Snapshot {
    pub fn from_indicators(bars: &[OhlcvBar], set: &IndicatorSet) -> Result<Self, InputError> {
        let last = bars.last().ok_or(InputError::Empty)?;
        if set.len() != bars.len() {
            return Err(InputError::LengthMismatch {
                what: "indicator set",
                expected: bars.len(),
                actual: set.len(),
            });
        }

        let previous = bars.len().checked_sub(2).map(|i| &bars[i]);

        Ok(Snapshot {
            date: last.date,
            close: last.close,
            close_change: previous.map(|p| last.close - p.close),
            volume: last.volume,
            volume_change: previous.map(|p| i128::from(last.volume) - i128::from(p.volume)),
            rsi: set.rsi.last_value(),
            stoch_k: set.stochastic.k.last_value(),
            stoch_d: set.stochastic.d.last_value(),
            macd: set.macd.line.last_value(),
            macd_signal: set.macd.signal.last_value(),
            macd_histogram: set.macd.histogram.last_value(),
        })
    }
}

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

fn fmt_signed(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}", v),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} Close:   {:.2} ({})",
            self.date,
            self.close,
            fmt_signed(self.close_change)
        )?;
        let volume_change = self
            .volume_change
            .map(|v| format!("{:+}", v))
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(f, "{} Volume:  {} ({})", self.date, self.volume, volume_change)?;
        writeln!(f, "RSI:       {}", fmt_value(self.rsi))?;
        writeln!(f, "K Value:   {}", fmt_value(self.stoch_k))?;
        writeln!(f, "D Value:   {}", fmt_value(self.stoch_d))?;
        writeln!(f, "MACD:      {}", fmt_value(self.macd))?;
        writeln!(f, "Signal:    {}", fmt_value(self.macd_signal))?;
        write!(f, "MacdH:     {}", fmt_value(self.macd_histogram))
    }
}
