use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use stockdash::prelude::{DashboardError, DashboardPipeline, today_in};

// --- Type Aliases for Shared State ---

// One pipeline serves every request; it holds no per-request state
pub type SharedPipeline = Arc<DashboardPipeline>;

// --- Market Clock ---

/// Decides what "today" means for default date ranges
#[derive(Clone, Copy, Debug)]
pub struct MarketClock {
    pub timezone: Tz,
}

impl MarketClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn today(&self) -> NaiveDate {
        today_in(self.timezone)
    }
}

// --- API Payloads ---

/// Body of every failed `/api/series` response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

impl From<&DashboardError> for ErrorResponse {
    fn from(error: &DashboardError) -> Self {
        let kind = match error {
            DashboardError::EmptyTicker => "empty_ticker",
            DashboardError::EmptyResult { .. } => "empty_result",
            DashboardError::Fetch(_) => "fetch_failed",
        };
        Self {
            error: error.user_message(),
            kind,
        }
    }
}
