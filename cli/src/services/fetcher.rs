use crate::error::FetchError;
use crate::models::{PriceBar, PriceSeries, Ticker};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of daily OHLCV history.
///
/// Implementations return an empty series (not an error) for unknown tickers,
/// ranges without trading days and inverted ranges. Errors are reserved for
/// the provider itself being unreachable or returning garbage.
#[async_trait]
pub trait MarketDataFetcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bars for `ticker` with `start <= date <= end`, ascending
    async fn fetch(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, FetchError>;
}

/// In-memory provider keyed by upper-case ticker; counts calls
#[derive(Debug, Default)]
pub struct StaticFetcher {
    data: HashMap<String, Vec<PriceBar>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_uppercase(), bars);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataFetcher for StaticFetcher {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let bars = self
            .data
            .get(ticker.as_str())
            .map(|bars| {
                bars.iter()
                    .filter(|bar| bar.date >= start && bar.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(PriceSeries::from_unordered(ticker.clone(), bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_static_fetcher_filters_range_and_counts_calls() {
        let bars = (1..=10).map(|d| PriceBar::new(date(d), 10.0, 11.0, 9.0, 10.5, 100)).collect();
        let fetcher = StaticFetcher::new().with_bars("spy", bars);
        let ticker = Ticker::parse("SPY").unwrap();

        let series = fetcher.fetch(&ticker, date(3), date(5)).await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), Some(date(3)));

        let inverted = fetcher.fetch(&ticker, date(5), date(3)).await.unwrap();
        assert!(inverted.is_empty());

        let unknown = fetcher.fetch(&Ticker::parse("ZZZZ9").unwrap(), date(1), date(10)).await.unwrap();
        assert!(unknown.is_empty());

        assert_eq!(fetcher.calls(), 3);
    }
}
