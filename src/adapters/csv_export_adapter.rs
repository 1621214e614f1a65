//! CSV export adapter.
//!
//! Indicator exports have one row per bar with a column per series; undefined
//! values are written as empty cells. Trade exports have one row per completed
//! trade and a trailing `open` row when a position is still held.

use crate::domain::backtest::BacktestResult;
use crate::domain::engine::IndicatorSet;
use crate::domain::error::{InputError, StockboardError};
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct CsvExportAdapter;

impl CsvExportAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Serialize)]
struct TradeRow {
    status: &'static str,
    entry_date: String,
    entry_price: f64,
    exit_date: Option<String>,
    exit_price: Option<f64>,
    pnl: Option<f64>,
    return_pct: Option<f64>,
    holding_bars: Option<usize>,
}

fn csv_error(path: &Path, e: csv::Error) -> StockboardError {
    StockboardError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn bar_date(bars: &[OhlcvBar], index: usize) -> Result<String, StockboardError> {
    bars.get(index)
        .map(|b| b.date.to_string())
        .ok_or(StockboardError::InvalidInput(InputError::LengthMismatch {
            what: "trade index",
            expected: bars.len(),
            actual: index + 1,
        }))
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Renders the indicator table into any writer.
pub fn write_indicator_table<W: std::io::Write>(
    writer: W,
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
) -> Result<(), csv::Error> {
    let series = indicators.all_series();
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(series.iter().map(|s| s.indicator_type.to_string()));
    wtr.write_record(&header)?;

    for (i, bar) in bars.iter().enumerate() {
        let mut record = vec![
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ];
        record.extend(series.iter().map(|s| cell(s.value_at(i))));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvExportAdapter {
    fn write_indicators(
        &self,
        bars: &[OhlcvBar],
        indicators: &IndicatorSet,
        output_path: &Path,
    ) -> Result<(), StockboardError> {
        if indicators.len() != bars.len() {
            return Err(InputError::LengthMismatch {
                what: "indicator set",
                expected: bars.len(),
                actual: indicators.len(),
            }
            .into());
        }

        let file = File::create(output_path)?;
        write_indicator_table(file, bars, indicators).map_err(|e| csv_error(output_path, e))?;
        info!(rows = bars.len(), path = %output_path.display(), "indicator table written");
        Ok(())
    }

    fn write_trades(
        &self,
        bars: &[OhlcvBar],
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), StockboardError> {
        let mut rows = Vec::with_capacity(result.trades.len() + 1);
        for trade in &result.trades {
            rows.push(TradeRow {
                status: "closed",
                entry_date: bar_date(bars, trade.entry_index)?,
                entry_price: trade.entry_price,
                exit_date: Some(bar_date(bars, trade.exit_index)?),
                exit_price: Some(trade.exit_price),
                pnl: Some(trade.pnl()),
                return_pct: Some(trade.return_pct() * 100.0),
                holding_bars: Some(trade.holding_bars()),
            });
        }
        if let Some(open) = &result.open_position {
            rows.push(TradeRow {
                status: "open",
                entry_date: bar_date(bars, open.entry_index)?,
                entry_price: open.entry_price,
                exit_date: None,
                exit_price: None,
                pnl: None,
                return_pct: None,
                holding_bars: None,
            });
        }

        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| csv_error(output_path, e))?;
        for row in &rows {
            wtr.serialize(row).map_err(|e| csv_error(output_path, e))?;
        }
        wtr.flush()?;
        info!(trades = result.trade_count, path = %output_path.display(), "trade list written");
        Ok(())
    }
}
