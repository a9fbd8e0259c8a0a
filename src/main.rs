pub mod api;
pub mod config;
pub mod data_structures;
pub mod page;

use crate::data_structures::{MarketClock, SharedPipeline};
use crate::page::SharedTemplates;
use anyhow::Context;
use axum::{extract::FromRef, routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use stockdash::prelude::DashboardPipeline;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;

#[derive(Clone)]
struct AppState {
    pipeline: SharedPipeline,
    clock: MarketClock,
    templates: SharedTemplates,
}

impl FromRef<AppState> for SharedPipeline {
    fn from_ref(app_state: &AppState) -> SharedPipeline {
        app_state.pipeline.clone()
    }
}

impl FromRef<AppState> for SharedTemplates {
    fn from_ref(app_state: &AppState) -> SharedTemplates {
        app_state.templates.clone()
    }
}

impl FromRef<AppState> for MarketClock {
    fn from_ref(app_state: &AppState) -> MarketClock {
        app_state.clock
    }
}

// Routes shared by the server and the handler tests; rate limiting is added in main
fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::dashboard_handler))
        .route("/api/series", get(api::series_handler))
        .route("/health", get(api::health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::AppConfig::load()?;

    // Initialize tracing with node_name in all logs
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Set a global span with node_name for all subsequent logs
    let _span = tracing::info_span!("node", name = %app_config.node_name).entered();

    tracing::info!("Starting stockdash-web");
    tracing::info!(
        ?app_config.environment,
        port = app_config.port,
        provider = ?app_config.provider,
        timezone = %app_config.market_timezone,
        "Loaded configuration"
    );

    let fetcher = app_config.build_fetcher()?;
    let app_state = AppState {
        pipeline: Arc::new(DashboardPipeline::new(fetcher, app_config.default_ticker.clone())),
        clock: MarketClock::new(app_config.market_timezone),
        templates: Arc::new(page::templates().context("Failed to compile page templates")?),
    };

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(app_config.rate_limit.per_second)
            .burst_size(app_config.rate_limit.burst_size)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    let router = app(app_state).layer(GovernorLayer::new(governor_conf));

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    tracing::info!(%addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
