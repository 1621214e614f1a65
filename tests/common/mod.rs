#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Write;
use std::process::ExitCode;
pub use stockboard::domain::ohlcv::OhlcvBar;
use stockboard::domain::error::StockboardError;
use stockboard::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<OhlcvBar>, StockboardError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StockboardError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(bars) if !bars.is_empty() => Ok(bars.clone()),
            _ => Err(StockboardError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, StockboardError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// One bar per calendar day starting at `start_date`.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000 + i as u64,
        })
        .collect()
}

/// A deterministic oscillating series that produces crosses for every strategy.
pub fn oscillating_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 15.0 * (t / 8.0).sin() + 0.05 * t
        })
        .collect()
}

pub fn generate_bars(start_date: &str, count: usize) -> Vec<OhlcvBar> {
    bars_from_closes(start_date, &oscillating_closes(count))
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_bars_csv(dir: &std::path::Path, ticker: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", ticker)), content).unwrap();
}

pub fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(
        format!("{code:?}"),
        format!("{:?}", ExitCode::from(expected)),
        "unexpected exit code"
    );
}
