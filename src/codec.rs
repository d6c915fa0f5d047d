//! Canonical CSV codec
//!
//! The CSV files are the single source of truth the repository loads. Rows
//! are written in a caller-chosen column order so every file has a stable
//! shape no matter how the wiki tables were laid out. A value is quoted only
//! when it contains a comma, a double quote or a line break; embedded quotes
//! are doubled.
//!
//! List-valued cells (group members, an event's groups and additional
//! properties) hold one entry per line, so they always end up quoted. The
//! lone `-` marks a list that is deliberately empty.

use std::io;

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use crate::error::Result;
use crate::record::Record;

/// Cell text for a deliberately empty list
pub const EMPTY_LIST: &str = "-";

/// Encode records as CSV with a header row of `columns`.
///
/// Columns missing from a record are written as empty fields; fields not in
/// `columns` are dropped.
pub fn encode(records: &[Record], columns: &[&str]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|column| record.value(column)))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Decode CSV text whose first row names the fields.
///
/// Lenient: rows may be shorter or longer than the header (short
/// rows simply lack the trailing keys, surplus cells are ignored), stray
/// quotes inside unquoted fields are kept literally, and blank lines are
/// skipped.
pub fn decode(text: &str) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        records.push(headers.iter().zip(row.iter()).collect());
    }

    Ok(records)
}

/// Split a list-valued cell into its entries.
///
/// Entries are trimmed and empty lines dropped. An empty cell and the `-`
/// sentinel both decode to no entries.
pub fn split_multi_line(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() || value == EMPTY_LIST {
        return Vec::new();
    }
    value
        .lines()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Join list entries into a single cell, using `-` for an empty list
pub fn join_multi_line<S: AsRef<str>>(entries: &[S]) -> String {
    if entries.is_empty() {
        return EMPTY_LIST.to_string();
    }
    entries
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;

    fn event(fields: [&str; 6]) -> Record {
        RecordKind::Event
            .columns()
            .iter()
            .copied()
            .zip(fields)
            .collect()
    }

    #[test]
    fn test_quoting_rules() {
        let record: Record = [("a", "plain"), ("b", "x,y"), ("c", "say \"hi\""), ("d", "l1\nl2")]
            .into_iter()
            .collect();
        let text = encode(&[record], &["a", "b", "c", "d"]).unwrap();
        assert_eq!(text, "a,b,c,d\nplain,\"x,y\",\"say \"\"hi\"\"\",\"l1\nl2\"\n");
    }

    #[test]
    fn test_columns_follow_caller_order() {
        let record: Record = [("notes", "n"), ("event_name", "e")].into_iter().collect();
        let text = encode(&[record], &["event_name", "event_table", "notes"]).unwrap();
        assert_eq!(text, "event_name,event_table,notes\ne,,n\n");
    }

    #[test]
    fn test_round_trip() {
        let records = vec![
            event([
                "project_created",
                "User created a \"new\" project, finally",
                "Project Events",
                "user_context\nsession_context",
                "project_id\nproject_name",
                "",
            ]),
            event(["project_favorited", "", "Project Events", "user_context", "-", "Line one\nLine two"]),
        ];
        let columns = RecordKind::Event.columns();
        let decoded = decode(&encode(&records, columns).unwrap()).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_list_cells_survive_encoding() {
        let columns = RecordKind::PropertyGroup.columns();
        for members in [vec![], vec!["user_id"], vec!["user_id", "email", "user_tier"]] {
            let record: Record = [
                ("group_name", "g".to_string()),
                ("description", String::new()),
                ("properties", join_multi_line(&members)),
            ]
            .into_iter()
            .collect();
            let decoded = decode(&encode(&[record], columns).unwrap()).unwrap();
            assert_eq!(split_multi_line(decoded[0].value("properties")), members);
        }
    }

    #[test]
    fn test_lenient_column_count() {
        let text = "a,b,c\n1,2\n4,5,6,7\n";
        let records = decode(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("c"), None);
        assert_eq!(records[1].value("c"), "6");
        assert_eq!(records[1].len(), 3);
    }

    #[test]
    fn test_relaxed_quotes_and_blank_lines() {
        let text = "name,description\n\nuser_id,the \"primary\" key\n";
        let records = decode(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("description"), "the \"primary\" key");
    }

    #[test]
    fn test_split_multi_line() {
        assert!(split_multi_line("").is_empty());
        assert!(split_multi_line("-").is_empty());
        assert!(split_multi_line(" \n ").is_empty());
        assert_eq!(split_multi_line(" a \n\nb\r\n"), vec!["a", "b"]);
        assert_eq!(join_multi_line::<&str>(&[]), "-");
    }
}
