//! Naming rules for generated modules
//!
//! Spec names are used verbatim as file names; identifiers and table
//! directories are derived from them here.

use std::sync::OnceLock;

use regex::Regex;

/// Directory for events declared outside any table
pub const UNCATEGORIZED: &str = "uncategorized";

fn event_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+events?$").expect("static pattern"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`
pub fn to_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Directory name for an event table: "Registration Events" -> "registration"
pub fn to_directory_name(table: &str) -> String {
    let lower = table.to_lowercase();
    let trimmed = event_suffix().replace(&lower, "");
    let dashed = whitespace().replace_all(&trimmed, "-");
    dashed
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Table an event is filed under, falling back to [`UNCATEGORIZED`]
pub fn table_or_default(table: &str) -> &str {
    if table.is_empty() {
        UNCATEGORIZED
    } else {
        table
    }
}
