use crate::error::DashboardError;
use crate::models::{enrich, DashboardQuery, EnrichedPriceSeries, ResolvedRequest};
use crate::services::fetcher::MarketDataFetcher;
use crate::utils::Timer;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Output of one successful run: what was asked for and the chart-ready series
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub request: ResolvedRequest,
    pub series: EnrichedPriceSeries,
}

/// Resolve -> fetch -> empty check -> enrich, run once per user request
#[derive(Clone)]
pub struct DashboardPipeline {
    fetcher: Arc<dyn MarketDataFetcher>,
    default_ticker: String,
}

impl DashboardPipeline {
    pub fn new(fetcher: Arc<dyn MarketDataFetcher>, default_ticker: impl Into<String>) -> Self {
        Self {
            fetcher,
            default_ticker: default_ticker.into(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.fetcher.name()
    }

    pub fn default_ticker(&self) -> &str {
        &self.default_ticker
    }

    /// Run the whole pipeline. Issues exactly one fetch unless the input is
    /// rejected first, and stops before enrichment when no rows come back.
    #[instrument(skip(self, query), fields(provider = self.fetcher.name()))]
    pub async fn run(&self, query: DashboardQuery, today: NaiveDate) -> Result<DashboardData, DashboardError> {
        let request = query.resolve(today, &self.default_ticker)?;
        info!(ticker = %request.ticker, start = %request.start, end = %request.end, "Resolved dashboard request");

        if request.is_inverted() {
            warn!(ticker = %request.ticker, "Start date is after end date");
        }

        let timer = Timer::start("market data fetch");
        let series = self
            .fetcher
            .fetch(&request.ticker, request.start, request.end)
            .await
            .map_err(|e| {
                error!(ticker = %request.ticker, error = %e, "Market data fetch failed");
                DashboardError::from(e)
            })?;
        timer.log_elapsed();

        if series.is_empty() {
            warn!(ticker = %request.ticker, "Fetch returned no rows");
            return Err(DashboardError::EmptyResult {
                ticker: request.ticker,
                start: request.start,
                end: request.end,
            });
        }

        let series = enrich(&series);
        info!(ticker = %request.ticker, rows = series.len(), "Enriched price series");

        Ok(DashboardData { request, series })
    }
}
