use crate::models::Ticker;
use chrono::NaiveDate;
use thiserror::Error;

/// User-facing text shown when a fetch yields no rows
pub const EMPTY_RESULT_MESSAGE: &str = "No data found. Check your stock ticker or date range.";

/// Failures talking to a market data provider
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {0}")]
    Status(u16),
    #[error("could not decode provider payload: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Decode(error.to_string())
    }
}

/// Why a dashboard run stopped before rendering
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("ticker symbol must not be empty")]
    EmptyTicker,
    #[error("no data for {ticker} between {start} and {end}")]
    EmptyResult {
        ticker: Ticker,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("market data provider failed: {0}")]
    Fetch(#[from] FetchError),
}

impl DashboardError {
    /// Warning text for the page or terminal
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::EmptyTicker => "Enter a stock ticker symbol (e.g. AAPL).".to_string(),
            DashboardError::EmptyResult { .. } => EMPTY_RESULT_MESSAGE.to_string(),
            DashboardError::Fetch(_) => {
                format!("Market data is unavailable right now. {}", EMPTY_RESULT_MESSAGE)
            }
        }
    }
}
