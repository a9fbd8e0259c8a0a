//! # stockdash - daily stock price dashboard core
//!
//! Fetches daily OHLCV history for one ticker and date range, derives the
//! 20- and 50-period simple moving averages, and shapes the result into a
//! table and Plotly chart figures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockdash::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Arc::new(YahooClient::new(true, Duration::from_secs(30))?);
//!     let pipeline = DashboardPipeline::new(fetcher, DEFAULT_TICKER);
//!     let today = today_in(parse_timezone(DEFAULT_MARKET_TIMEZONE)?);
//!
//!     let data = pipeline.run(DashboardQuery::new(Some("msft".into()), None, None), today).await?;
//!     println!("{}", render_text_table(&data.series));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod presentation;
pub mod services;
pub mod utils;

pub mod prelude {
    //! Commonly used types and functions
    //!
    //! ```rust
    //! use stockdash::prelude::*;
    //! ```

    pub use crate::error::{DashboardError, FetchError, EMPTY_RESULT_MESSAGE};
    pub use crate::models::{
        enrich, DashboardQuery, EnrichedBar, EnrichedPriceSeries, PriceBar, PriceSeries, ResolvedRequest, Ticker,
        DEFAULT_TICKER,
    };
    pub use crate::presentation::{build_figures, render_text_table, write_csv, DashboardFigures};
    pub use crate::services::{
        CsvFetcher, DashboardData, DashboardPipeline, MarketDataFetcher, StaticFetcher, YahooClient,
    };
    pub use crate::utils::{parse_timezone, today_in, DEFAULT_MARKET_TIMEZONE};
}

pub use utils::{init_logger, Timer};
