use super::Ticker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Prices are positive and finite, and high/low bound open and close
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
    }

    /// Close at or above open (drawn as an increasing candle)
    pub fn is_rising(&self) -> bool {
        self.close >= self.open
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("bar dated {date} is not after the previous bar dated {previous}")]
    OutOfOrder { previous: NaiveDate, date: NaiveDate },
    #[error("bar dated {date} violates OHLC bounds")]
    InvalidBar { date: NaiveDate },
}

/// Daily bars for one ticker, strictly ascending by date.
///
/// The constructors are the only way in, so every `PriceSeries` holds unique,
/// ordered, well-formed bars. An empty series is valid: it is what a provider
/// returns for an unknown ticker or a range without trading days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: Ticker,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            bars: Vec::new(),
        }
    }

    /// Build from bars that must already be ordered and valid
    pub fn try_new(ticker: Ticker, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_valid() {
                return Err(SeriesError::InvalidBar { date: bar.date });
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(SeriesError::OutOfOrder {
                    previous: bars[i - 1].date,
                    date: bar.date,
                });
            }
        }
        Ok(Self { ticker, bars })
    }

    /// Build from provider rows: drops malformed bars, sorts by date and keeps
    /// the last bar seen for a repeated date
    pub fn from_unordered(ticker: Ticker, bars: Vec<PriceBar>) -> Self {
        let total = bars.len();
        let mut valid: Vec<PriceBar> = bars.into_iter().filter(PriceBar::is_valid).collect();
        if valid.len() < total {
            warn!(
                ticker = %ticker,
                dropped = total - valid.len(),
                "Dropped bars violating OHLC bounds"
            );
        }

        valid.sort_by_key(|bar| bar.date);

        let mut deduped: Vec<PriceBar> = Vec::with_capacity(valid.len());
        for bar in valid {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            ticker,
            bars: deduped,
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }
}
