//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::engine::IndicatorSet;
use crate::domain::error::StockboardError;
use crate::domain::ohlcv::OhlcvBar;
use std::path::Path;

/// Port for handing computed series to a presentation layer.
pub trait ReportPort {
    /// One row per bar: OHLCV plus every indicator series.
    fn write_indicators(
        &self,
        bars: &[OhlcvBar],
        indicators: &IndicatorSet,
        output_path: &Path,
    ) -> Result<(), StockboardError>;

    /// One row per completed trade, followed by the open position if any.
    fn write_trades(
        &self,
        bars: &[OhlcvBar],
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), StockboardError>;
}
