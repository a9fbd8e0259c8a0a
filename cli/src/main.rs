use stockdash::{
    init_logger,
    prelude::*,
    presentation::summary_line,
    utils::format_date,
};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "stockdash")]
#[command(about = "Daily stock prices with SMA20/SMA50, as a table or chart-ready JSON")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the price table and a one-line summary
    Show {
        #[command(flatten)]
        query: QueryArgs,
        /// Table layout
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the close, volume and candlestick figures as Plotly JSON
    Chart {
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Args)]
pub struct QueryArgs {
    /// Ticker symbol (case-insensitive)
    #[arg(short, long)]
    ticker: Option<String>,
    /// First date (YYYY-MM-DD), defaults to 30 days before today
    #[arg(short, long)]
    start: Option<NaiveDate>,
    /// Last date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    end: Option<NaiveDate>,
    /// Read {TICKER}.csv files from this directory instead of Yahoo Finance
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Timezone used to decide what "today" is
    #[arg(long, default_value = DEFAULT_MARKET_TIMEZONE)]
    timezone: String,
    /// HTTP timeout for the Yahoo request
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
}

/// Runs the pipeline; `None` means a warning was already printed
async fn run_pipeline(args: QueryArgs) -> anyhow::Result<Option<DashboardData>> {
    let fetcher: Arc<dyn MarketDataFetcher> = match &args.data_dir {
        Some(dir) => Arc::new(CsvFetcher::new(dir)),
        None => Arc::new(YahooClient::new(true, Duration::from_secs(args.timeout_secs))?),
    };
    let today = today_in(parse_timezone(&args.timezone)?);

    let pipeline = DashboardPipeline::new(fetcher, DEFAULT_TICKER);
    let query = DashboardQuery::new(args.ticker, args.start, args.end);

    match pipeline.run(query, today).await {
        Ok(data) => Ok(Some(data)),
        Err(e) => {
            eprintln!("⚠️  {}", e.user_message());
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { query, format } => {
            let Some(data) = run_pipeline(query).await? else {
                std::process::exit(1);
            };

            match format {
                OutputFormat::Table => {
                    println!(
                        "📈 {} from {} to {}",
                        data.request.ticker,
                        format_date(data.request.start),
                        format_date(data.request.end)
                    );
                    println!();
                    print!("{}", render_text_table(&data.series));
                    if let Some(summary) = summary_line(&data.series) {
                        println!();
                        println!("{}", summary);
                    }
                }
                OutputFormat::Csv => {
                    write_csv(&data.series, std::io::stdout().lock())?;
                }
            }
        }
        Commands::Chart { query } => {
            let Some(data) = run_pipeline(query).await? else {
                std::process::exit(1);
            };

            let figures = build_figures(&data.series);
            println!("{}", serde_json::to_string_pretty(&figures)?);
        }
    }

    Ok(())
}
