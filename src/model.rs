//! Typed spec records
//!
//! Built once from raw [`Record`]s when the repository loads. Property types
//! become a [`PropertyType`] tag and constraint strings become a
//! [`Constraint`] with any regex compiled up front, so validation never
//! re-parses spec text.

use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::codec::{split_multi_line, EMPTY_LIST};
use crate::record::{Record, RecordKind};

/// Declared type of a property.
///
/// The tag set is open: anything that is not a known tag is kept verbatim as
/// [`PropertyType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    /// ISO-8601 text on the wire
    Timestamp,
    Array,
    Object,
    /// Placeholder for names that could not be resolved; matches anything
    Unknown,
    Other(String),
}

impl PropertyType {
    /// Parse a type tag from a spec cell (case-insensitive)
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_ascii_lowercase().as_str() {
            "string" => PropertyType::String,
            "number" => PropertyType::Number,
            "boolean" => PropertyType::Boolean,
            "timestamp" => PropertyType::Timestamp,
            "array" => PropertyType::Array,
            "object" => PropertyType::Object,
            "unknown" => PropertyType::Unknown,
            _ => PropertyType::Other(tag.to_string()),
        }
    }

    /// Tag as written in the spec
    pub fn as_str(&self) -> &str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Timestamp => "timestamp",
            PropertyType::Array => "array",
            PropertyType::Object => "object",
            PropertyType::Unknown => "unknown",
            PropertyType::Other(tag) => tag,
        }
    }

    /// Name of the payload value kind this type travels as
    pub fn wire_kind(&self) -> &str {
        match self {
            PropertyType::Timestamp => "string",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PropertyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Value rule attached to a property
#[derive(Debug, Clone, Default)]
pub enum Constraint {
    #[default]
    None,
    /// Value must be one of these
    Enum(Vec<String>),
    /// Value text must match `pattern`. `regex` is `None` when the stored
    /// pattern does not compile; such a rule is not enforced.
    Pattern { pattern: String, regex: Option<Regex> },
}

impl Constraint {
    /// Parse a constraint cell: empty, `-`, `enum: a, b` or `regex: <pattern>`.
    ///
    /// Unrecognized text carries no rule.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(values) = raw.strip_prefix("enum:") {
            Constraint::Enum(values.split(',').map(|v| v.trim().to_string()).collect())
        } else if let Some(pattern) = raw.strip_prefix("regex:") {
            let pattern = pattern.trim().to_string();
            let regex = Regex::new(&pattern).ok();
            Constraint::Pattern { pattern, regex }
        } else {
            Constraint::None
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Constraint::None)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constraint::None, Constraint::None) => true,
            (Constraint::Enum(a), Constraint::Enum(b)) => a == b,
            (Constraint::Pattern { pattern: a, .. }, Constraint::Pattern { pattern: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Optional free-text cell: empty becomes `None`
fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// A single event property
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub property_type: PropertyType,
    /// Constraint text as stored in the spec
    pub constraints: Option<String>,
    /// Parsed form of `constraints`
    pub constraint: Constraint,
    pub description: String,
    pub usage: Option<String>,
}

impl Property {
    pub fn from_record(record: &Record) -> Self {
        let constraints = record.value("constraints");
        Self {
            name: record.value(RecordKind::Property.key_column()).to_string(),
            property_type: PropertyType::parse(record.value("type")),
            constraints: optional(constraints),
            constraint: Constraint::parse(constraints),
            description: record.value("description").to_string(),
            usage: optional(record.value("usage")),
        }
    }

    /// Constraint text meaningful to readers: `None` for empty and `-`
    pub fn display_constraints(&self) -> Option<&str> {
        self.constraints
            .as_deref()
            .filter(|c| c.trim() != EMPTY_LIST)
    }
}

/// A reusable bundle of properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyGroup {
    pub name: String,
    pub description: String,
    /// Member property names, in display order
    pub properties: Vec<String>,
}

impl PropertyGroup {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: record.value(RecordKind::PropertyGroup.key_column()).to_string(),
            description: record.value("description").to_string(),
            properties: split_multi_line(record.value("properties")),
        }
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// A tracked analytics event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub description: String,
    /// Wiki section the event was declared in
    pub table: String,
    pub property_groups: Vec<String>,
    pub additional_properties: Vec<String>,
    pub notes: Option<String>,
}

impl Event {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: record.value(RecordKind::Event.key_column()).to_string(),
            description: record.value("event_description").to_string(),
            table: record.value("event_table").to_string(),
            property_groups: split_multi_line(record.value("property_groups")),
            additional_properties: split_multi_line(record.value("additional_properties")),
            notes: optional(record.value("notes")),
        }
    }

    pub fn uses_group(&self, group: &str) -> bool {
        self.property_groups.iter().any(|g| g == group)
    }

    pub fn uses_property_directly(&self, property: &str) -> bool {
        self.additional_properties.iter().any(|p| p == property)
    }
}
