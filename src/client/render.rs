//! Plain-text rendering of listings, notices and probe results.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::api::dto::{CreateRecordResponse, HealthResponse, RecordListResponse};
use crate::client::http::ErrorNotice;
use crate::domain::VisitorRecord;

/// Shown in place of an absent value.
pub const PLACEHOLDER: &str = "N/A";

const HEADERS: [&str; 6] = ["ID", "Name", "Device", "Latitude", "Longitude", "Visit time"];

/// Renders a listing as an aligned text table.
///
/// The title carries the number of rendered rows; an empty listing renders the
/// title, the server's hint if any, and a "no records" line.
#[must_use]
pub fn render_table(listing: &RecordListResponse) -> String {
    let mut out = String::new();

    if listing.records.is_empty() {
        out.push_str("Visitor records\n");
        if let Some(hint) = &listing.message {
            let _ = writeln!(out, "{hint}");
        }
        out.push_str("No visitor records found.\n");
        return out;
    }

    let _ = writeln!(out, "Visitor records ({} visitors)", listing.records.len());

    let rows: Vec<[String; 6]> = listing.records.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

/// Renders an error notice: the message, then the detail line if any.
#[must_use]
pub fn render_error(notice: &ErrorNotice) -> String {
    match &notice.detail {
        Some(detail) => format!("{}\n{detail}\n", notice.message),
        None => format!("{}\n", notice.message),
    }
}

/// Renders the confirmation shown after a record is saved.
#[must_use]
pub fn render_saved(response: &CreateRecordResponse) -> String {
    let record = &response.record;
    format!(
        "{}\nName: {} | Device: {} | Location: {}, {} | Visited: {}\n",
        response.message,
        text_or_placeholder(Some(record.name.as_str())),
        text_or_placeholder(record.device.as_deref()),
        coordinate(record.latitude),
        coordinate(record.longitude),
        timestamp(record.visit_time),
    )
}

/// Renders a successful connectivity probe.
#[must_use]
pub fn render_probe(health: &HealthResponse) -> String {
    format!(
        "{}\nDatabase: {}\nUser: {}\nVersion: {}\n",
        health.message, health.database, health.user, health.version
    )
}

fn row_cells(record: &VisitorRecord) -> [String; 6] {
    [
        record.id.to_string(),
        text_or_placeholder(Some(record.name.as_str())),
        text_or_placeholder(record.device.as_deref()),
        coordinate(record.latitude),
        coordinate(record.longitude),
        timestamp(record.visit_time),
    ]
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

fn text_or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn coordinate(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v:.4}"))
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
