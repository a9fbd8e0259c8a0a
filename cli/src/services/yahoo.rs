use crate::error::FetchError;
use crate::models::{PriceBar, PriceSeries, Ticker};
use crate::services::fetcher::MarketDataFetcher;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Daily history from the Yahoo Finance v8 chart endpoint.
///
/// One HTTP request per `fetch`; no retry, cache or rate limiting.
pub struct YahooClient {
    client: Client,
    base_url: String,
    user_agents: Vec<String>,
    random_agent: bool,
}

impl YahooClient {
    pub fn new(random_agent: bool, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Ok(YahooClient {
            client,
            base_url: YAHOO_BASE_URL.to_string(),
            user_agents,
            random_agent,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn get_user_agent(&self) -> &str {
        if self.random_agent {
            use rand::seq::IndexedRandom;
            if let Some(agent) = self.user_agents.choose(&mut rand::rng()) {
                return agent;
            }
        }
        &self.user_agents[0]
    }

    /// `period2` is the midnight after `end`, so `end` itself is included.
    /// `period1` starts a day early so exchanges east of UTC keep their first
    /// session; rows outside `[start, end]` are dropped when parsing.
    pub fn chart_url(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> String {
        let period1 = midnight_timestamp(start.pred_opt().unwrap_or(start));
        let period2 = midnight_timestamp(end.succ_opt().unwrap_or(end));
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            urlencoding::encode(ticker.as_str()),
            period1,
            period2
        )
    }

    #[instrument(skip(self), fields(ticker = %ticker, %start, %end))]
    async fn fetch_chart(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, FetchError> {
        if start > end {
            debug!("Inverted date range, skipping request");
            return Ok(PriceSeries::empty(ticker.clone()));
        }

        let url = self.chart_url(ticker, start, end);
        debug!(%url, "Requesting chart history");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("User-Agent", self.get_user_agent())
            .header("Referer", "https://finance.yahoo.com/")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!("Provider does not know this symbol");
            return Ok(PriceSeries::empty(ticker.clone()));
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Chart request failed");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let series = parse_chart_response(ticker, &body, start, end)?;
        info!(rows = series.len(), "Fetched chart history");
        Ok(series)
    }
}

#[async_trait]
impl MarketDataFetcher for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, FetchError> {
        self.fetch_chart(ticker, start, end).await
    }
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Decode a chart payload into bars dated in the exchange's timezone.
///
/// "Not Found" errors and missing result/timestamp blocks mean no data.
/// Rows with a missing price are skipped; a missing volume counts as 0.
pub(crate) fn parse_chart_response(
    ticker: &Ticker,
    body: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, FetchError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Ok(PriceSeries::empty(ticker.clone()));
        }
        return Err(FetchError::Decode(format!(
            "{}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = envelope.chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(PriceSeries::empty(ticker.clone()));
    };
    let (Some(timestamps), Some(quote)) = (
        result.timestamp,
        result.indicators.and_then(|indicators| indicators.quote.into_iter().next()),
    ) else {
        return Ok(PriceSeries::empty(ticker.clone()));
    };

    let tz: Tz = result
        .meta
        .and_then(|meta| meta.exchange_timezone_name)
        .and_then(|name| name.parse().ok())
        .unwrap_or(Tz::UTC);

    let mut bars = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, &ts) in timestamps.iter().enumerate() {
        let time = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| FetchError::Decode(format!("invalid timestamp {} at index {}", ts, i)))?;
        let date = time.with_timezone(&tz).date_naive();
        if date < start || date > end {
            continue;
        }

        match (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        ) {
            (Some(open), Some(high), Some(low), Some(close)) => {
                let volume = value_at(&quote.volume, i).map_or(0, |v| v.max(0.0).round() as u64);
                bars.push(PriceBar::new(date, open, high, low, close, volume));
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(ticker = %ticker, skipped, "Skipped rows with missing prices");
    }

    Ok(PriceSeries::from_unordered(ticker.clone(), bars))
}
