//! Section splitting
//!
//! A wiki page is a sequence of `## ` sections, each holding at most one
//! table. Only the first contiguous table block of a section is read.

use tracing::debug;

use super::table::parse_table;
use crate::record::Record;

/// Heading marker that starts a new section
const SECTION_MARKER: &str = "## ";

/// One `## ` section of a wiki page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Heading text, trimmed
    pub title: &'a str,
    /// Lines after the heading
    pub body: Vec<&'a str>,
}

impl<'a> Section<'a> {
    /// The first table block in this section.
    ///
    /// Starts at the first line beginning with `|` and runs until the first
    /// non-empty line that does not; blank lines inside the run are kept.
    pub fn table_block(&self) -> Option<&[&'a str]> {
        let start = self
            .body
            .iter()
            .position(|line| line.trim_start().starts_with('|'))?;

        let mut end = start;
        for (idx, line) in self.body.iter().enumerate().skip(start) {
            let trimmed = line.trim();
            if trimmed.starts_with('|') {
                end = idx;
            } else if !trimmed.is_empty() {
                break;
            }
        }

        Some(&self.body[start..=end])
    }

    /// Parse this section's table, if it has one
    pub fn records(&self) -> Vec<Record> {
        self.table_block().map(parse_table).unwrap_or_default()
    }
}

/// Split a document into sections.
///
/// Text before the first heading forms its own section whose title is its
/// first line. Sections with no non-whitespace content are dropped.
pub fn split_sections(content: &str) -> Vec<Section<'_>> {
    let mut chunks: Vec<Vec<&str>> = vec![Vec::new()];

    for line in content.lines() {
        match line.strip_prefix(SECTION_MARKER) {
            Some(heading) => chunks.push(vec![heading]),
            None => {
                if let Some(chunk) = chunks.last_mut() {
                    chunk.push(line);
                }
            }
        }
    }

    chunks
        .into_iter()
        .filter(|chunk| chunk.iter().any(|line| !line.trim().is_empty()))
        .map(|chunk| {
            let (title, body) = chunk.split_first().map_or(("", &[][..]), |(t, b)| (*t, b));
            Section {
                title: title.trim(),
                body: body.to_vec(),
            }
        })
        .collect()
}

/// Parse every section's table into one record sequence, in source order.
///
/// When `section_field` is given, each record is stamped with the title of
/// the section it came from under that key.
pub fn parse_sections(content: &str, section_field: Option<&str>) -> Vec<Record> {
    let mut all_rows = Vec::new();

    for section in split_sections(content) {
        let mut rows = section.records();
        debug!(section = section.title, rows = rows.len(), "parsed section");

        if let Some(field) = section_field {
            for row in &mut rows {
                row.set(field, section.title);
            }
        }
        all_rows.extend(rows);
    }

    all_rows
}
