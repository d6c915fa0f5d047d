//! Pipe table parsing
//!
//! Turns one contiguous block of `|`-delimited lines into records. The first
//! line names the columns, the second is the separator rule and is skipped
//! unconditionally, every further line is a data row.

use std::sync::OnceLock;

use regex::Regex;

use crate::record::Record;

/// Inline line-break marker used for multi-line cells
fn line_break() -> &'static Regex {
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    LINE_BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("line-break pattern is valid"))
}

/// Normalize a header cell into a field key: `Event Name` -> `event_name`
pub fn normalize_header(cell: &str) -> String {
    cell.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Whether a line is pure table framing (`|---|:--|`)
fn is_rule_line(line: &str) -> bool {
    if line.starts_with("|--") {
        return true;
    }
    line.len() > 1
        && line.starts_with('|')
        && line.ends_with('|')
        && line[1..line.len() - 1]
            .chars()
            .all(|c| c == '-' || c == '|' || c == ':' || c.is_whitespace())
        && line.contains('-')
}

/// Split a table line into trimmed cells, dropping the empty cells the
/// outer `|` framing produces. A missing closing `|` leaves the last cell.
fn split_cells(line: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = line.split('|').map(str::trim).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

/// Parse the column keys from a header line
pub fn parse_headers(line: &str) -> Vec<String> {
    split_cells(line.trim())
        .into_iter()
        .map(normalize_header)
        .collect()
}

/// Parse a table block into records.
///
/// Rows with fewer cells than headers are padded with empty strings; surplus
/// cells are ignored. A block needs a header, a separator and at least one
/// data line to yield anything.
pub fn parse_table(lines: &[&str]) -> Vec<Record> {
    if lines.len() < 3 {
        return Vec::new();
    }

    let headers = parse_headers(lines[0]);
    let mut rows = Vec::new();

    for raw in &lines[2..] {
        let line = raw.trim();
        if line.is_empty() || is_rule_line(line) {
            continue;
        }

        let cells = split_cells(line);
        if cells.is_empty() {
            continue;
        }

        let mut record = Record::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = cells.get(idx).copied().unwrap_or("");
            record.set(header.as_str(), line_break().replace_all(value, "\n"));
        }
        rows.push(record);
    }

    rows
}
