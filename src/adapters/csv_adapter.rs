//! CSV file data adapter.
//!
//! Reads one `<TICKER>.csv` file per ticker from a base directory. Each file
//! carries the header `date,open,high,low,close,volume` with ISO dates.

use crate::domain::error::StockboardError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn field<T>(record: &csv::StringRecord, index: usize, name: &str, line: u64) -> Result<T, StockboardError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| StockboardError::Data {
        reason: format!("line {}: missing {} column", line, name),
    })?;
    raw.trim().parse().map_err(|e| StockboardError::Data {
        reason: format!("line {}: invalid {} value '{}': {}", line, name, raw, e),
    })
}

fn parse_record(record: &csv::StringRecord) -> Result<OhlcvBar, StockboardError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    let date_str = record.get(0).ok_or_else(|| StockboardError::Data {
        reason: format!("line {}: missing date column", line),
    })?;
    let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
        StockboardError::Data {
            reason: format!("line {}: invalid date format: {}", line, e),
        }
    })?;

    Ok(OhlcvBar {
        date,
        open: field(record, 1, "open", line)?,
        high: field(record, 2, "high", line)?,
        low: field(record, 3, "low", line)?,
        close: field(record, 4, "close", line)?,
        volume: field(record, 5, "volume", line)?,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<OhlcvBar>, StockboardError> {
        let path = self.csv_path(ticker);
        if !path.is_file() {
            return Err(StockboardError::NoData {
                ticker: ticker.to_string(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|e| StockboardError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StockboardError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            bars.push(parse_record(&record)?);
        }

        if bars.is_empty() {
            return Err(StockboardError::NoData {
                ticker: ticker.to_string(),
            });
        }

        debug!(ticker, bars = bars.len(), path = %path.display(), "loaded price history");
        Ok(bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StockboardError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StockboardError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StockboardError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(ticker) = name_str.strip_suffix(".csv") {
                if !ticker.is_empty() {
                    tickers.push(ticker.to_string());
                }
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
