//! Single-position backtest simulator.
//!
//! A forward scan over close prices with two states, FLAT and LONG. Each trade is
//! notionally one unit of the underlying; there are no fees, slippage or sizing.

use crate::domain::engine::IndicatorSet;
use crate::domain::error::InputError;
use crate::domain::ohlcv::{closes, OhlcvBar};
use crate::domain::signal::{generate_signals, SignalPair, SignalStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
}

impl Trade {
    /// Per-unit profit or loss.
    pub fn pnl(&self) -> f64 {
        self.exit_price - self.entry_price
    }

    pub fn return_pct(&self) -> f64 {
        self.pnl() / self.entry_price
    }

    pub fn holding_bars(&self) -> usize {
        self.exit_index - self.entry_index
    }

    pub fn is_win(&self) -> bool {
        self.exit_price > self.entry_price
    }
}

/// A position still held at the last bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub entry_index: usize,
    pub entry_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub trade_count: usize,
    pub win_rate: f64,
    pub open_position: Option<OpenPosition>,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Flat,
    Long { entry_index: usize, entry_price: f64 },
}

pub fn run_backtest(closes: &[f64], signals: &SignalPair) -> Result<BacktestResult, InputError> {
    for (what, len) in [("entry signal", signals.entry.len()), ("exit signal", signals.exit.len())] {
        if len != closes.len() {
            return Err(InputError::LengthMismatch {
                what,
                expected: closes.len(),
                actual: len,
            });
        }
    }

    let mut trades = Vec::new();
    let mut state = State::Flat;

    for (i, &close) in closes.iter().enumerate() {
        state = match state {
            State::Flat if signals.entry[i] => State::Long {
                entry_index: i,
                entry_price: close,
            },
            State::Long {
                entry_index,
                entry_price,
            } if signals.exit[i] && i > entry_index => {
                trades.push(Trade {
                    entry_index,
                    exit_index: i,
                    entry_price,
                    exit_price: close,
                });
                State::Flat
            }
            unchanged => unchanged,
        };
    }

    let open_position = match state {
        State::Flat => None,
        State::Long {
            entry_index,
            entry_price,
        } => Some(OpenPosition {
            entry_index,
            entry_price,
        }),
    };

    let trade_count = trades.len();
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let win_rate = if trade_count > 0 {
        wins as f64 / trade_count as f64
    } else {
        0.0
    };

    Ok(BacktestResult {
        trades,
        trade_count,
        win_rate,
        open_position,
    })
}

/// Signal generation followed by the simulator, over the closes of `bars`.
pub fn run_strategy(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    strategy: &SignalStrategy,
) -> Result<BacktestResult, InputError> {
    if indicators.len() != bars.len() {
        return Err(InputError::LengthMismatch {
            what: "indicator set",
            expected: bars.len(),
            actual: indicators.len(),
        });
    }

    let signals = generate_signals(strategy, indicators)?;
    run_backtest(&closes(bars), &signals)
}
