use super::{PriceBar, PriceSeries, Ticker};
use crate::utils::sma::{sma_with_window, SMA_LONG_WINDOW, SMA_SHORT_WINDOW};
use serde::{Deserialize, Serialize};

/// A price bar with its moving averages. `None` means not enough history yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBar {
    #[serde(flatten)]
    pub bar: PriceBar,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPriceSeries {
    pub ticker: Ticker,
    pub bars: Vec<EnrichedBar>,
}

impl EnrichedPriceSeries {
    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn bars(&self) -> &[EnrichedBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&EnrichedBar> {
        self.bars.last()
    }
}

/// Derive SMA20 and SMA50 over the close column.
///
/// Output has one bar per input bar, in the same order, with OHLCV copied
/// unchanged. Empty in, empty out.
pub fn enrich(series: &PriceSeries) -> EnrichedPriceSeries {
    let closes = series.closes();
    let sma20 = sma_with_window(&closes, SMA_SHORT_WINDOW);
    let sma50 = sma_with_window(&closes, SMA_LONG_WINDOW);

    let bars = series
        .bars()
        .iter()
        .zip(sma20)
        .zip(sma50)
        .map(|((bar, sma20), sma50)| EnrichedBar {
            bar: bar.clone(),
            sma20,
            sma50,
        })
        .collect();

    EnrichedPriceSeries {
        ticker: series.ticker().clone(),
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn ramp_series(len: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..len)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar::new(
                    start + Duration::days(i as i64),
                    close - 0.5,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1_000 + i as u64,
                )
            })
            .collect();
        PriceSeries::try_new(Ticker::parse("RAMP").unwrap(), bars).unwrap()
    }

    #[test]
    fn test_enrich_preserves_records_and_order() {
        let series = ramp_series(55);
        let enriched = enrich(&series);

        assert_eq!(enriched.len(), series.len());
        assert_eq!(enriched.ticker().as_str(), "RAMP");
        for (out, input) in enriched.bars().iter().zip(series.bars()) {
            assert_eq!(&out.bar, input);
        }
    }

    #[test]
    fn test_enrich_linear_ramp() {
        let enriched = enrich(&ramp_series(55));
        let bars = enriched.bars();

        assert_eq!(bars[19].bar.close, 119.0);
        assert_eq!(bars[19].sma20, Some(109.5));
        assert_eq!(bars[18].sma20, None);
        assert_eq!(bars[49].bar.close, 149.0);
        assert_eq!(bars[49].sma50, Some(124.5));
        assert!(bars[..49].iter().all(|b| b.sma50.is_none()));
    }

    #[test]
    fn test_enrich_empty() {
        let enriched = enrich(&PriceSeries::empty(Ticker::parse("NONE").unwrap()));
        assert!(enriched.is_empty());
        assert!(enriched.latest().is_none());
    }

    #[test]
    fn test_single_record_has_no_averages() {
        let enriched = enrich(&ramp_series(1));
        let only = &enriched.bars()[0];
        assert_eq!(only.sma20, None);
        assert_eq!(only.sma50, None);
    }

    #[test]
    fn test_enrich_is_deterministic() {
        let series = ramp_series(70);
        let first = enrich(&series);
        let second = enrich(&series);

        assert_eq!(first, second);
        for (a, b) in first.bars().iter().zip(second.bars()) {
            assert_eq!(a.sma20.map(f64::to_bits), b.sma20.map(f64::to_bits));
            assert_eq!(a.sma50.map(f64::to_bits), b.sma50.map(f64::to_bits));
        }
    }

    #[test]
    fn test_undefined_average_serializes_as_null() {
        let enriched = enrich(&ramp_series(2));
        let json = serde_json::to_value(&enriched).unwrap();

        assert_eq!(json["ticker"], "RAMP");
        assert!(json["bars"][0]["sma20"].is_null());
        assert!(json["bars"][1]["sma50"].is_null());
        assert_eq!(json["bars"][1]["close"], 101.0);
        assert_eq!(json["bars"][0]["date"], "2024-01-01");
    }
}
