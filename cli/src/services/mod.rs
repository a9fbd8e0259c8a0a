pub mod csv_fetcher;
pub mod fetcher;
pub mod pipeline;
pub mod yahoo;

pub use csv_fetcher::CsvFetcher;
pub use fetcher::{MarketDataFetcher, StaticFetcher};
pub use pipeline::{DashboardData, DashboardPipeline};
pub use yahoo::YahooClient;
