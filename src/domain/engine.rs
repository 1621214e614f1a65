//! Indicator engine: one configurable pass over a bar sequence.
//!
//! `IndicatorConfig` carries every window the dashboard charts; `compute_indicators`
//! validates the bars and the configuration, then produces an `IndicatorSet` whose
//! series are all aligned with the input.

use crate::domain::error::InputError;
use crate::domain::indicator::{
    calculate_ema, calculate_macd, calculate_rsi, calculate_sma, calculate_stochastic, macd,
    stochastic, IndicatorSeries, IndicatorType, MacdOutput, StochasticOutput,
};
use crate::domain::ohlcv::{validate_bars, OhlcvBar};

pub const DEFAULT_SMA_WINDOWS: [usize; 4] = [20, 60, 120, 240];
pub const DEFAULT_RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub sma_windows: Vec<usize>,
    pub ema_windows: Vec<usize>,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub stoch_smooth: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_windows: DEFAULT_SMA_WINDOWS.to_vec(),
            ema_windows: Vec::new(),
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            rsi_period: DEFAULT_RSI_PERIOD,
            stoch_period: stochastic::DEFAULT_PERIOD,
            stoch_smooth: stochastic::DEFAULT_SMOOTH,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), InputError> {
        for &w in &self.sma_windows {
            positive("sma_windows", w)?;
        }
        for &w in &self.ema_windows {
            positive("ema_windows", w)?;
        }
        positive("macd_fast", self.macd_fast)?;
        positive("macd_slow", self.macd_slow)?;
        positive("macd_signal", self.macd_signal)?;
        positive("rsi_period", self.rsi_period)?;
        positive("stoch_period", self.stoch_period)?;
        positive("stoch_smooth", self.stoch_smooth)?;

        if self.macd_fast >= self.macd_slow {
            return Err(InputError::InvalidParameter {
                name: "macd_fast",
                reason: format!(
                    "fast period {} must be shorter than slow period {}",
                    self.macd_fast, self.macd_slow
                ),
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: usize) -> Result<(), InputError> {
    if value == 0 {
        return Err(InputError::InvalidParameter {
            name,
            reason: "window must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Every indicator series for one bar sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub sma: Vec<IndicatorSeries>,
    pub ema: Vec<IndicatorSeries>,
    pub macd: MacdOutput,
    pub rsi: IndicatorSeries,
    pub stochastic: StochasticOutput,
}

impl IndicatorSet {
    pub fn sma(&self, window: usize) -> Option<&IndicatorSeries> {
        self.sma
            .iter()
            .find(|s| s.indicator_type == IndicatorType::Sma(window))
    }

    /// All series in display order: moving averages, MACD, RSI, stochastic.
    pub fn all_series(&self) -> Vec<&IndicatorSeries> {
        let mut out: Vec<&IndicatorSeries> = self.sma.iter().chain(&self.ema).collect();
        out.extend([
            &self.macd.line,
            &self.macd.signal,
            &self.macd.histogram,
            &self.rsi,
            &self.stochastic.k,
            &self.stochastic.d,
        ]);
        out
    }

    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }
}

pub fn compute_indicators(
    bars: &[OhlcvBar],
    config: &IndicatorConfig,
) -> Result<IndicatorSet, InputError> {
    validate_bars(bars)?;
    config.validate()?;

    Ok(IndicatorSet {
        sma: config
            .sma_windows
            .iter()
            .map(|&w| calculate_sma(bars, w))
            .collect(),
        ema: config
            .ema_windows
            .iter()
            .map(|&w| calculate_ema(bars, w))
            .collect(),
        macd: calculate_macd(bars, config.macd_fast, config.macd_slow, config.macd_signal),
        rsi: calculate_rsi(bars, config.rsi_period),
        stochastic: calculate_stochastic(bars, config.stoch_period, config.stoch_smooth),
    })
}
