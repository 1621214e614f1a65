//! Trade statistics for a completed backtest.
//!
//! All money figures are per one unit of the underlying, matching the simulator.

use super::backtest::BacktestResult;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub total_return: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_holding_bars: f64,
}

impl TradeStats {
    pub fn compute(result: &BacktestResult) -> Self {
        let trades = &result.trades;

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_holding = 0usize;
        let mut growth = 1.0_f64;

        for trade in trades {
            let pnl = trade.pnl();
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                if pnl > largest_win {
                    largest_win = pnl;
                }
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                if pnl.abs() > largest_loss {
                    largest_loss = pnl.abs();
                }
            } else {
                trades_breakeven += 1;
            }

            total_holding += trade.holding_bars();
            growth *= 1.0 + trade.return_pct();
        }

        let total_trades = trades.len();

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let avg_holding_bars = if total_trades > 0 {
            total_holding as f64 / total_trades as f64
        } else {
            0.0
        };

        TradeStats {
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate: result.win_rate,
            total_pnl: total_wins - total_losses,
            total_return: growth - 1.0,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            avg_holding_bars,
        }
    }
}
