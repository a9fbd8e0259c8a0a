use super::Ticker;
use crate::error::DashboardError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
pub const DEFAULT_TICKER: &str = "AAPL";

/// Raw user input for one dashboard run. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end: Option<NaiveDate>,
}

/// Inputs after defaults and normalization, ready for the fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRequest {
    pub ticker: Ticker,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DashboardQuery {
    pub fn new(ticker: Option<String>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { ticker, start, end }
    }

    /// Apply defaults and normalize the ticker.
    ///
    /// A missing ticker falls back to `default_ticker`; a blank one is
    /// rejected. `start > end` is passed through as-is.
    pub fn resolve(self, today: NaiveDate, default_ticker: &str) -> Result<ResolvedRequest, DashboardError> {
        let raw_ticker = self.ticker.as_deref().unwrap_or(default_ticker);
        let ticker = Ticker::parse(raw_ticker).ok_or(DashboardError::EmptyTicker)?;

        Ok(ResolvedRequest {
            ticker,
            start: self.start.unwrap_or(today - Duration::days(DEFAULT_LOOKBACK_DAYS)),
            end: self.end.unwrap_or(today),
        })
    }
}

impl ResolvedRequest {
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

// HTML date inputs submit "" when left blank
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
