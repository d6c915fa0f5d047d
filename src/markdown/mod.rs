//! Wiki markdown parsing
//!
//! The wiki pages are hand-edited, so parsing never fails: rows with missing
//! cells get empty values, sections without a table contribute nothing, and
//! framing quirks are skipped.

pub mod sections;
pub mod table;

pub use sections::{parse_sections, split_sections, Section};
pub use table::{normalize_header, parse_headers, parse_table};

use crate::record::{Record, RecordKind};

/// Parse a wiki page of the given kind into raw records.
///
/// Events are stamped with the title of their enclosing section.
pub fn parse_document(content: &str, kind: RecordKind) -> Vec<Record> {
    parse_sections(content, kind.section_field())
}
