//! Output formatting helpers for CLI commands

use crate::history::{HistoryRecord, Window};
use crate::rate::RateRecord;
use chrono::{DateTime, Local, TimeZone};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::{json, Value};

/// Render a JSON scalar for a table cell; strings are shown unquoted.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Format a query-rate snapshot as a key/value table
pub fn format_rate_table(record: &RateRecord, fetched_at: &DateTime<Local>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Statistic", "Value"]);

    match &record.0 {
        Value::Object(fields) => {
            for (key, value) in fields {
                table.add_row(vec![Cell::new(key), Cell::new(cell_text(value))]);
            }
        }
        other => {
            table.add_row(vec![Cell::new("value"), Cell::new(cell_text(other))]);
        }
    }

    format!(
        "{}\n{}",
        format!("Query rate at {}", fetched_at.format("%Y-%m-%d %H:%M:%S"))
            .bold(),
        table
    )
}

/// Format a query-rate snapshot as a single JSON line
pub fn format_rate_json(record: &RateRecord, fetched_at: &DateTime<Local>) -> String {
    json!({
        "fetched_at": fetched_at.to_rfc3339(),
        "record": record,
    })
    .to_string()
}

/// Render an epoch-millisecond bound in local time, falling back to the raw number.
fn format_bound(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(t) => format!("{} ({})", t.format("%Y-%m-%d %H:%M:%S%.3f"), millis),
        None => millis.to_string(),
    }
}

/// Format ingest-history records as a table
///
/// Columns are the union of object keys across records, in first-seen
/// order. Non-object records are shown in a `value` column.
pub fn format_history_table(window: &Window, records: &[HistoryRecord]) -> String {
    let mut columns: Vec<String> = Vec::new();
    let mut has_scalars = false;
    for record in records {
        match &record.0 {
            Value::Object(fields) => {
                for key in fields.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
            _ => has_scalars = true,
        }
    }

    let mut header = vec!["#".to_string()];
    header.extend(columns.iter().cloned());
    if has_scalars {
        header.push("value".to_string());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);

    for (i, record) in records.iter().enumerate() {
        let mut row = vec![Cell::new(i + 1)];
        match &record.0 {
            Value::Object(fields) => {
                row.extend(
                    columns
                        .iter()
                        .map(|c| Cell::new(fields.get(c).map(cell_text).unwrap_or_default())),
                );
                if has_scalars {
                    row.push(Cell::new(""));
                }
            }
            other => {
                row.extend(columns.iter().map(|_| Cell::new("")));
                row.push(Cell::new(cell_text(other)));
            }
        }
        table.add_row(row);
    }

    format!(
        "{} {} → {}  ingestType={}  ({} records)\n{}",
        "Ingest history".bold(),
        format_bound(window.start),
        format_bound(window.end),
        window.ingest_type,
        records.len(),
        table
    )
}

/// Format ingest-history records as JSON
pub fn format_history_json(
    window: &Window,
    records: &[HistoryRecord],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "window": window,
        "records": records,
    }))
}
