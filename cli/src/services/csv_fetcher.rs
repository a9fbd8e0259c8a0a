use crate::error::FetchError;
use crate::models::{PriceBar, PriceSeries, Ticker};
use crate::services::fetcher::MarketDataFetcher;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Offline provider reading `{data_dir}/{TICKER}.csv`.
///
/// Files use the Yahoo export layout (`Date,Open,High,Low,Close,Volume`,
/// extra columns ignored). The file is read on every call.
#[derive(Debug, Clone)]
pub struct CsvFetcher {
    data_dir: PathBuf,
}

/// Raw CSV row as exported by Yahoo Finance, which writes `null` for gaps
#[derive(Debug, Deserialize)]
struct RawCsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open", deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(rename = "High", deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(rename = "Low", deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(rename = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(rename = "Volume", deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

impl RawCsvRow {
    /// `None` when any price is missing
    fn to_price_bar(&self) -> Result<Option<PriceBar>, FetchError> {
        // Accept "2024-01-02" as well as "2024-01-02 00:00:00-05:00"
        let day = self.date.get(..10).unwrap_or(&self.date);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| FetchError::Decode(format!("bad date '{}': {}", self.date, e)))?;

        let (Some(open), Some(high), Some(low), Some(close)) = (self.open, self.high, self.low, self.close) else {
            return Ok(None);
        };
        let volume = self.volume.map_or(0, |v| v.max(0.0).round() as u64);

        Ok(Some(PriceBar::new(date, open, high, low, close, volume)))
    }
}

impl CsvFetcher {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Data file for `ticker`, or `None` when the symbol would leave `data_dir`
    fn file_for(&self, ticker: &Ticker) -> Option<PathBuf> {
        let file_name = format!("{}.csv", ticker);
        let mut components = Path::new(&file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !file_name.contains('\\') => Some(self.data_dir.join(file_name)),
            _ => None,
        }
    }

    #[instrument(skip(self), fields(ticker = %ticker, %start, %end))]
    fn read_series(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, FetchError> {
        let Some(path) = self.file_for(ticker) else {
            warn!("Ticker is not a plain file name, treating as unknown");
            return Ok(PriceSeries::empty(ticker.clone()));
        };
        if !path.exists() {
            info!(path = %path.display(), "No data file for ticker");
            return Ok(PriceSeries::empty(ticker.clone()));
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for row in reader.deserialize::<RawCsvRow>() {
            match row?.to_price_bar()? {
                Some(bar) if bar.date >= start && bar.date <= end => bars.push(bar),
                Some(_) => {}
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "Skipped rows with missing prices");
        }

        debug!(rows = bars.len(), path = %path.display(), "Loaded CSV rows in range");
        Ok(PriceSeries::from_unordered(ticker.clone(), bars))
    }
}

#[async_trait]
impl MarketDataFetcher for CsvFetcher {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, FetchError> {
        let fetcher = self.clone();
        let ticker = ticker.clone();
        tokio::task::spawn_blocking(move || fetcher.read_series(&ticker, start, end))
            .await
            .map_err(|e| FetchError::Io(e.into()))?
    }
}
