//! Plain-text previews for the console.
//!
//! Absent cells print as `-` so gaps never masquerade as numbers.

use chrono::NaiveDate;
use indexlab_core::index::IndexSummary;
use indexlab_core::{DateSeries, Panel};

const ABSENT: &str = "-";

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{v:.4}"))
}

fn render(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in rows {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.len());
        }
    }

    let mut out = String::new();
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (c, &w))| {
                if i == 0 {
                    format!("{c:<w$}")
                } else {
                    format!("{c:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };
    out.push_str(&format!("{}\n", line(headers)));
    for row in rows {
        out.push_str(&format!("{}\n", line(row)));
    }
    out
}

fn panel_rows(panel: &Panel) -> Vec<Vec<String>> {
    panel
        .dates()
        .iter()
        .enumerate()
        .map(|(i, date)| {
            std::iter::once(date.to_string())
                .chain(panel.row(i).into_iter().map(cell))
                .collect()
        })
        .collect()
}

/// Date × entity table with one column per entity.
pub fn format_table(panel: &Panel) -> String {
    let headers: Vec<String> = std::iter::once("date".to_string())
        .chain(panel.entities().iter().map(|e| e.to_string()))
        .collect();
    render(&headers, &panel_rows(panel))
}

/// First and last `n` rows of a table. Short tables print once.
pub fn format_table_preview(panel: &Panel, n: usize) -> String {
    if panel.n_dates() <= n * 2 {
        return format_table(panel);
    }
    format!(
        "{}  ...\n{}",
        format_table(&panel.head(n)),
        format_table(&panel.tail(n))
    )
}

fn series_rows(series: &DateSeries<f64>) -> Vec<Vec<String>> {
    series
        .iter()
        .map(|(date, value)| vec![date.to_string(), cell(value)])
        .collect()
}

/// A whole series as a two-column table.
pub fn format_series(label: &str, series: &DateSeries<f64>) -> String {
    render(&["date".to_string(), label.to_string()], &series_rows(series))
}

/// First and last `n` points of a series.
pub fn format_series_preview(label: &str, series: &DateSeries<f64>, n: usize) -> String {
    if series.len() <= n * 2 {
        return format_series(label, series);
    }
    format!(
        "{}  ...\n{}",
        format_series(label, &series.head(n)),
        format_series(label, &series.tail(n))
    )
}

fn pct(x: f64) -> String {
    format!("{:+.2}%", x * 100.0)
}

fn date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Headline numbers, one per line.
pub fn format_summary(name: &str, summary: &IndexSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{name}\n"));
    out.push_str(&format!(
        "  base:         {} = {:.2}\n",
        date(summary.base_date),
        summary.base_value
    ));
    out.push_str(&format!(
        "  latest:       {} = {:.2}\n",
        date(summary.last_date),
        summary.last_value
    ));
    out.push_str(&format!("  total return: {}\n", pct(summary.total_return)));
    out.push_str(&format!(
        "  entities:     {} (peak active {})\n",
        summary.entity_count, summary.peak_active
    ));
    out.push_str(&format!("  observations: {}\n", summary.observations));
    out
}
