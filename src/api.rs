use crate::data_structures::{ErrorResponse, MarketClock, SharedPipeline};
use crate::page::{self, FormValues, PageBody, SharedTemplates};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::{Query, QueryRejection};
use stockdash::prelude::{DashboardError, DashboardQuery};
use stockdash::utils::format_date;
use tracing::{debug, error, info, instrument, warn};

fn status_for(error: &DashboardError) -> StatusCode {
    match error {
        DashboardError::EmptyTicker => StatusCode::BAD_REQUEST,
        DashboardError::EmptyResult { .. } => StatusCode::NOT_FOUND,
        DashboardError::Fetch(_) => StatusCode::BAD_GATEWAY,
    }
}

fn form_from_query(query: &DashboardQuery, default_ticker: &str) -> FormValues {
    FormValues {
        ticker: query.ticker.clone().unwrap_or_else(|| default_ticker.to_string()),
        start: query.start.map(format_date).unwrap_or_default(),
        end: query.end.map(format_date).unwrap_or_default(),
    }
}

fn html_page(templates: &SharedTemplates, form: &FormValues, body: PageBody<'_>) -> Response {
    match page::render_page(templates, form, body) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render dashboard page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

#[instrument(skip(pipeline, clock, templates, query))]
pub async fn dashboard_handler(
    State(pipeline): State<SharedPipeline>,
    State(clock): State<MarketClock>,
    State(templates): State<SharedTemplates>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    debug!("Received dashboard page request");

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected dashboard query");
            let form = FormValues {
                ticker: pipeline.default_ticker().to_string(),
                ..Default::default()
            };
            return html_page(&templates, &form, PageBody::Warning("Dates must use the YYYY-MM-DD format.".to_string()));
        }
    };

    let form = form_from_query(&query, pipeline.default_ticker());
    match pipeline.run(query, clock.today()).await {
        Ok(data) => {
            info!(ticker = %data.request.ticker, rows = data.series.len(), "Rendering dashboard");
            html_page(&templates, &FormValues::from_data(&data), PageBody::Dashboard(&data))
        }
        Err(e) => {
            warn!(error = %e, "Dashboard halted");
            html_page(&templates, &form, PageBody::Warning(e.user_message()))
        }
    }
}

#[instrument(skip(pipeline, clock, query))]
pub async fn series_handler(
    State(pipeline): State<SharedPipeline>,
    State(clock): State<MarketClock>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Response {
    debug!("Received series API request");

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected series query");
            let body = ErrorResponse {
                error: rejection.to_string(),
                kind: "bad_query",
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match pipeline.run(query, clock.today()).await {
        Ok(data) => {
            info!(ticker = %data.request.ticker, rows = data.series.len(), "Returning series");
            (StatusCode::OK, Json(data.series)).into_response()
        }
        Err(e) => {
            let status = status_for(&e);
            warn!(error = %e, status = status.as_u16(), "Series request failed");
            (status, Json(ErrorResponse::from(&e))).into_response()
        }
    }
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use crate::data_structures::MarketClock;
    use crate::{AppState, app};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        Router,
    };
    use chrono::{Duration, NaiveDate};
    use chrono_tz::Tz;
    use std::sync::Arc;
    use stockdash::prelude::{DashboardPipeline, MarketDataFetcher, PriceBar, StaticFetcher, YahooClient};
    use tower::ServiceExt;

    fn bars(count: i64) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar::new(start + Duration::days(i), close - 0.5, close + 1.0, close - 1.0, close, 5_000 + i as u64)
            })
            .collect()
    }

    fn router_with(fetcher: Arc<dyn MarketDataFetcher>) -> Router {
        let state = AppState {
            pipeline: Arc::new(DashboardPipeline::new(fetcher, "AAPL")),
            clock: MarketClock::new(Tz::America__New_York),
            templates: Arc::new(crate::page::templates().unwrap()),
        };
        app(state)
    }

    fn test_router() -> Router {
        router_with(Arc::new(StaticFetcher::new().with_bars("AAPL", bars(60))))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(test_router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_dashboard_page_renders_charts() {
        let (status, html) = get(test_router(), "/?ticker=aapl&start=2024-01-01&end=2024-03-31").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("AAPL Closing Price (with SMA20 & SMA50)"));
        assert!(html.contains("AAPL Candlestick Chart"));
        assert_eq!(html.matches("Plotly.newPlot").count(), 3);
        assert!(html.contains(r#"value="2024-03-31""#));
    }

    #[tokio::test]
    async fn test_dashboard_unknown_ticker_shows_warning() {
        let (status, html) = get(test_router(), "/?ticker=ZZZZ9&start=2024-01-01&end=2024-03-31").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("No data found. Check your stock ticker or date range."));
        assert!(html.contains(r#"value="ZZZZ9""#));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[tokio::test]
    async fn test_dashboard_escapes_ticker_input() {
        let (status, html) = get(test_router(), "/?ticker=%22%3E%3Cscript%3Ex%3C%2Fscript%3E").await;

        assert_eq!(status, StatusCode::OK);
        assert!(!html.contains("<SCRIPT>X"));
        assert!(!html.contains("<script>x"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;x"));
    }

    #[tokio::test]
    async fn test_dashboard_bad_date_shows_warning() {
        let (status, html) = get(test_router(), "/?ticker=AAPL&start=01/02/2024").await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("YYYY-MM-DD"));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[tokio::test]
    async fn test_series_returns_enriched_rows() {
        let (status, body) = get(test_router(), "/api/series?ticker=aapl&start=2024-01-01&end=2024-03-31").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let rows = json["bars"].as_array().unwrap();

        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(rows.len(), 60);
        assert_eq!(rows[0]["date"], "2024-01-02");
        assert!(rows[18]["sma20"].is_null());
        assert_eq!(rows[19]["sma20"], 109.5);
        assert!(rows[48]["sma50"].is_null());
        assert_eq!(rows[49]["sma50"], 124.5);
    }

    #[tokio::test]
    async fn test_series_empty_result_is_not_found() {
        let (status, body) = get(test_router(), "/api/series?ticker=ZZZZ9&start=2024-01-01&end=2024-03-31").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "No data found. Check your stock ticker or date range.");
        assert_eq!(json["kind"], "empty_result");
    }

    #[tokio::test]
    async fn test_series_inverted_range_is_not_found() {
        let (status, _) = get(test_router(), "/api/series?ticker=AAPL&start=2024-03-01&end=2024-01-01").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_series_bad_input_is_bad_request() {
        let (status, body) = get(test_router(), "/api/series?ticker=%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("empty_ticker"));

        let (status, body) = get(test_router(), "/api/series?start=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("bad_query"));
    }

    #[tokio::test]
    async fn test_series_upstream_failure_is_bad_gateway() {
        let client = YahooClient::new(false, std::time::Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let (status, body) = get(
            router_with(Arc::new(client)),
            "/api/series?ticker=AAPL&start=2024-01-01&end=2024-01-31",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("fetch_failed"));
    }
}
