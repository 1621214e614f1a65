//! Price-history access port trait.

use crate::domain::error::StockboardError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Full daily history for `ticker`, in source order.
    fn fetch_bars(&self, ticker: &str) -> Result<Vec<OhlcvBar>, StockboardError>;

    fn list_tickers(&self) -> Result<Vec<String>, StockboardError>;
}
