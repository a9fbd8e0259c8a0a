use crate::models::{EnrichedBar, EnrichedPriceSeries};
use crate::utils::format_date;
use std::io;

pub const TABLE_HEADERS: [&str; 8] = ["Date", "Open", "High", "Low", "Close", "Volume", "SMA20", "SMA50"];

fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

/// Undefined averages render as an empty cell, never as 0
fn format_optional(value: Option<f64>) -> String {
    value.map(format_price).unwrap_or_default()
}

fn row_cells(row: &EnrichedBar) -> [String; 8] {
    [
        format_date(row.bar.date),
        format_price(row.bar.open),
        format_price(row.bar.high),
        format_price(row.bar.low),
        format_price(row.bar.close),
        row.bar.volume.to_string(),
        format_optional(row.sma20),
        format_optional(row.sma50),
    ]
}

/// Formatted cells for every bar, in series order
pub fn table_rows(series: &EnrichedPriceSeries) -> Vec<[String; 8]> {
    series.bars().iter().map(row_cells).collect()
}

/// Column-aligned plain-text table for terminals
pub fn render_text_table(series: &EnrichedPriceSeries) -> String {
    let rows = table_rows(series);
    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = TABLE_HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{:<w$}", h, w = w))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == 0 {
                    format!("{:<w$}", cell, w = w)
                } else {
                    format!("{:>w$}", cell, w = w)
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    out
}

/// Raw table as CSV with a header row
pub fn write_csv<W: io::Write>(series: &EnrichedPriceSeries, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(TABLE_HEADERS)?;
    for row in table_rows(series) {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One-line recap of the latest bar
pub fn summary_line(series: &EnrichedPriceSeries) -> Option<String> {
    let latest = series.latest()?;
    let or_na = |v: Option<f64>| v.map(format_price).unwrap_or_else(|| "n/a".to_string());
    Some(format!(
        "{} {} rows, last close {} on {} | SMA20 {} | SMA50 {}",
        series.ticker(),
        series.len(),
        format_price(latest.bar.close),
        format_date(latest.bar.date),
        or_na(latest.sma20),
        or_na(latest.sma50),
    ))
}
