//! Domain error types.

use chrono::NaiveDate;

/// Malformed input rejected before any indicator, signal or backtest computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("bar sequence is empty")]
    Empty,

    #[error("dates not strictly increasing at bar {index}: {previous} followed by {current}")]
    NonMonotonicDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("non-positive or non-finite {field} at bar {index}: {value}")]
    NonPositivePrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Top-level error type for stockboard.
#[derive(Debug, thiserror::Error)]
pub enum StockboardError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockboardError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            StockboardError::Io(_) => 1,
            StockboardError::ConfigParse { .. }
            | StockboardError::ConfigMissing { .. }
            | StockboardError::ConfigInvalid { .. } => 2,
            StockboardError::Data { .. } => 3,
            StockboardError::InvalidInput(_) => 4,
            StockboardError::NoData { .. } => 5,
        }
    }
}

impl From<&StockboardError> for std::process::ExitCode {
    fn from(err: &StockboardError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
