//! Download window selection ("1y", "3y", "5y", "10y", "max").

use crate::domain::ohlcv::OhlcvBar;
use chrono::Months;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookback {
    #[default]
    OneYear,
    ThreeYears,
    FiveYears,
    TenYears,
    Max,
}

impl Lookback {
    pub fn years(&self) -> Option<u32> {
        match self {
            Lookback::OneYear => Some(1),
            Lookback::ThreeYears => Some(3),
            Lookback::FiveYears => Some(5),
            Lookback::TenYears => Some(10),
            Lookback::Max => None,
        }
    }

    /// Keeps the bars dated after the last bar's date minus the window.
    pub fn apply<'a>(&self, bars: &'a [OhlcvBar]) -> &'a [OhlcvBar] {
        let (Some(years), Some(last)) = (self.years(), bars.last()) else {
            return bars;
        };
        let Some(cutoff) = last.date.checked_sub_months(Months::new(12 * years)) else {
            return bars;
        };
        let start = bars.partition_point(|b| b.date <= cutoff);
        &bars[start..]
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.years() {
            Some(y) => write!(f, "{}y", y),
            None => write!(f, "max"),
        }
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1y" => Ok(Lookback::OneYear),
            "3y" => Ok(Lookback::ThreeYears),
            "5y" => Ok(Lookback::FiveYears),
            "10y" => Ok(Lookback::TenYears),
            "max" => Ok(Lookback::Max),
            other => Err(format!(
                "unknown lookback '{}' (expected 1y, 3y, 5y, 10y or max)",
                other
            )),
        }
    }
}
