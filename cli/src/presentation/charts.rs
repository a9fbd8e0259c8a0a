//! Plotly figure builders for the three dashboard charts.
//!
//! Figures are plain `serde_json::Value`s so any front end that ships
//! plotly.js can draw them. Undefined averages become JSON `null`, which
//! Plotly renders as a gap in the line.

use crate::models::EnrichedPriceSeries;
use crate::utils::format_date;
use serde::Serialize;
use serde_json::{json, Value};

pub const INCREASING_COLOR: &str = "green";
pub const DECREASING_COLOR: &str = "red";
pub const CANDLESTICK_TEMPLATE: &str = "plotly_dark";

/// Zoom presets offered above the candlestick chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    OneWeek,
    OneMonth,
    ThreeMonths,
    All,
}

impl RangePreset {
    pub const BUTTONS: [RangePreset; 4] = [
        RangePreset::OneWeek,
        RangePreset::OneMonth,
        RangePreset::ThreeMonths,
        RangePreset::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::OneWeek => "1W",
            RangePreset::OneMonth => "1M",
            RangePreset::ThreeMonths => "3M",
            RangePreset::All => "All",
        }
    }

    /// Plotly `rangeselector` button definition
    pub fn button(&self) -> Value {
        match self {
            RangePreset::OneWeek => json!({"count": 7, "label": self.label(), "step": "day", "stepmode": "backward"}),
            RangePreset::OneMonth => json!({"count": 1, "label": self.label(), "step": "month", "stepmode": "backward"}),
            RangePreset::ThreeMonths => json!({"count": 3, "label": self.label(), "step": "month", "stepmode": "backward"}),
            RangePreset::All => json!({"label": self.label(), "step": "all"}),
        }
    }
}

/// All figures for one series
#[derive(Debug, Clone, Serialize)]
pub struct DashboardFigures {
    pub close: Value,
    pub volume: Value,
    pub candlestick: Value,
}

pub fn build_figures(series: &EnrichedPriceSeries) -> DashboardFigures {
    DashboardFigures {
        close: close_with_sma_figure(series),
        volume: volume_figure(series),
        candlestick: candlestick_figure(series),
    }
}

fn dates(series: &EnrichedPriceSeries) -> Vec<String> {
    series.bars().iter().map(|b| format_date(b.bar.date)).collect()
}

pub fn close_title(series: &EnrichedPriceSeries) -> String {
    format!("{} Closing Price (with SMA20 & SMA50)", series.ticker())
}

pub fn volume_title(series: &EnrichedPriceSeries) -> String {
    format!("{} Volume", series.ticker())
}

pub fn candlestick_title(series: &EnrichedPriceSeries) -> String {
    format!("{} Candlestick Chart", series.ticker())
}

/// Close, SMA20 and SMA50 as three lines sharing the date axis
pub fn close_with_sma_figure(series: &EnrichedPriceSeries) -> Value {
    let x = dates(series);
    let close: Vec<f64> = series.bars().iter().map(|b| b.bar.close).collect();
    let sma20: Vec<Option<f64>> = series.bars().iter().map(|b| b.sma20).collect();
    let sma50: Vec<Option<f64>> = series.bars().iter().map(|b| b.sma50).collect();

    let line = |name: &str, y: Value| {
        json!({
            "type": "scatter",
            "mode": "lines",
            "name": name,
            "x": x,
            "y": y,
            "connectgaps": false,
        })
    };

    json!({
        "data": [
            line("Close", json!(close)),
            line("SMA20", json!(sma20)),
            line("SMA50", json!(sma50)),
        ],
        "layout": {
            "title": {"text": close_title(series)},
            "xaxis": {"title": {"text": "Date"}, "type": "date"},
            "yaxis": {"title": {"text": "Price"}},
        },
    })
}

pub fn volume_figure(series: &EnrichedPriceSeries) -> Value {
    let volume: Vec<u64> = series.bars().iter().map(|b| b.bar.volume).collect();

    json!({
        "data": [{
            "type": "scatter",
            "mode": "lines",
            "name": "Volume",
            "x": dates(series),
            "y": volume,
        }],
        "layout": {
            "title": {"text": volume_title(series)},
            "xaxis": {"title": {"text": "Date"}, "type": "date"},
            "yaxis": {"title": {"text": "Volume"}},
        },
    })
}

/// OHLC candles with a range slider and the 1W / 1M / 3M / All selector
pub fn candlestick_figure(series: &EnrichedPriceSeries) -> Value {
    let bars = series.bars();
    let buttons: Vec<Value> = RangePreset::BUTTONS.iter().map(RangePreset::button).collect();

    json!({
        "data": [{
            "type": "candlestick",
            "name": series.ticker().as_str(),
            "x": dates(series),
            "open": bars.iter().map(|b| b.bar.open).collect::<Vec<_>>(),
            "high": bars.iter().map(|b| b.bar.high).collect::<Vec<_>>(),
            "low": bars.iter().map(|b| b.bar.low).collect::<Vec<_>>(),
            "close": bars.iter().map(|b| b.bar.close).collect::<Vec<_>>(),
            "increasing": {"line": {"color": INCREASING_COLOR}},
            "decreasing": {"line": {"color": DECREASING_COLOR}},
        }],
        "layout": {
            "title": {"text": candlestick_title(series)},
            "template": CANDLESTICK_TEMPLATE,
            "xaxis": {
                "title": {"text": "Date"},
                "type": "date",
                "rangeselector": {"buttons": buttons},
                "rangeslider": {"visible": true},
            },
            "yaxis": {"title": {"text": "Price"}},
        },
    })
}
