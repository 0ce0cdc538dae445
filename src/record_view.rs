//! Purpose: Shared record renderers for the menu and the scriptable subcommands.
//! Exports: `record_json`, `records_json`, `record_block`, `render_table`.
//! Role: Keep record envelope and console layout consistent across entry points.
//! Invariants: JSON keys are `id`, `name`, `phone`, `address`.
//! Invariants: Table cells never contain raw line breaks.

use hostel::Record;
use serde_json::{Value, json};

const RULE: &str = "------------------------------------";
pub(crate) const RECORD_HEADERS: [&str; 4] = ["ID", "NAME", "PHONE", "ADDRESS"];

pub(crate) fn record_json(record: &Record) -> Value {
    json!(record)
}

pub(crate) fn records_json(records: &[Record]) -> Value {
    json!({
        "count": records.len(),
        "records": records.iter().map(record_json).collect::<Vec<_>>(),
    })
}

pub(crate) fn record_block(record: &Record) -> String {
    [
        RULE.to_string(),
        format!(" Roll No  : {}", record.id),
        format!(" Name     : {}", record.name),
        format!(" Phone    : {}", record.phone),
        format!(" Address  : {}", record.address),
        RULE.to_string(),
    ]
    .join("\n")
}

pub(crate) fn record_row(record: &Record) -> Vec<String> {
    vec![
        record.id.clone(),
        record.name.clone(),
        record.phone.clone(),
        record.address.clone(),
    ]
}

pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let column_count = headers.len();
    let mut sanitized_rows = Vec::with_capacity(rows.len());
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        let mut sanitized = Vec::with_capacity(column_count);
        for (idx, width) in widths.iter_mut().enumerate() {
            let value = row.get(idx).map(String::as_str).unwrap_or("");
            let cleaned = sanitize_table_cell(value);
            *width = (*width).max(cleaned.chars().count());
            sanitized.push(cleaned);
        }
        sanitized_rows.push(sanitized);
    }

    let mut lines = Vec::with_capacity(sanitized_rows.len() + 1);
    lines.push(format_table_line(
        &headers
            .iter()
            .map(|header| header.to_string())
            .collect::<Vec<_>>(),
        &widths,
    ));
    for row in sanitized_rows {
        lines.push(format_table_line(&row, &widths));
    }
    lines.join("\n")
}

fn sanitize_table_cell(value: &str) -> String {
    value.replace('\n', "\\n").replace('\r', "\\r")
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        // No padding after the last column.
        if idx + 1 < widths.len() {
            let cell_len = cell.chars().count();
            if *width > cell_len {
                line.push_str(&" ".repeat(*width - cell_len));
            }
        }
    }
    line
}
