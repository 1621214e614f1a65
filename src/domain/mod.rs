//! Core domain types and logic.

pub mod ohlcv;
pub mod lookback;
pub mod indicator;
pub mod engine;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod snapshot;
pub mod config_validation;
pub mod error;
