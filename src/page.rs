//! Server-rendered dashboard page.
//!
//! The page is a single HTML document: a sidebar form that re-submits the
//! query, then either a warning box or the raw data table and three Plotly
//! charts. Figures are embedded as JSON and drawn by plotly.js from a CDN.
//! Templates are compiled into the binary and rendered with autoescaping.

use serde::Serialize;
use std::sync::Arc;
use stockdash::presentation::{TABLE_HEADERS, build_figures, table_rows};
use stockdash::prelude::DashboardData;
use stockdash::utils::format_date;
use tera::{Context, Tera};

pub const PAGE_TITLE: &str = "📈 Stock Price & Chart View";
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const DASHBOARD_TEMPLATE: &str = "dashboard.html";

pub type SharedTemplates = Arc<Tera>;

/// Compile the page templates
pub fn templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        (DASHBOARD_TEMPLATE, include_str!("../templates/dashboard.html")),
    ])?;
    Ok(tera)
}

/// Values echoed back into the sidebar form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormValues {
    pub ticker: String,
    pub start: String,
    pub end: String,
}

impl FormValues {
    pub fn from_data(data: &DashboardData) -> Self {
        Self {
            ticker: data.request.ticker.to_string(),
            start: format_date(data.request.start),
            end: format_date(data.request.end),
        }
    }
}

pub enum PageBody<'a> {
    Dashboard(&'a DashboardData),
    Warning(String),
}

// Keeps embedded JSON from closing the surrounding <script> element
fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Full HTML document for one request
pub fn render_page(tera: &Tera, form: &FormValues, body: PageBody<'_>) -> anyhow::Result<String> {
    let mut context = Context::new();
    context.insert("title", PAGE_TITLE);
    context.insert("form", form);

    match body {
        PageBody::Dashboard(data) => {
            let figures = serde_json::to_string(&build_figures(&data.series))?;
            context.insert("headers", &TABLE_HEADERS);
            context.insert("rows", &table_rows(&data.series));
            context.insert("figures", &script_safe_json(&figures));
            context.insert("plotly_cdn", PLOTLY_CDN);
        }
        PageBody::Warning(message) => context.insert("warning", &message),
    }

    Ok(tera.render(DASHBOARD_TEMPLATE, &context)?)
}
