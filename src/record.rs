//! Raw records and the three record kinds
//!
//! A [`Record`] is the untyped form every row takes between the wiki parser
//! and the repository: an ordered mapping from normalized column key to cell
//! text. [`RecordKind`] names the three tables and carries their file names
//! and canonical column order.

use std::fmt;

use serde::ser::{Serialize, Serializer};

/// Kind of spec record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A single event property
    Property,
    /// A reusable bundle of properties
    PropertyGroup,
    /// A tracked analytics event
    Event,
}

impl RecordKind {
    /// All kinds, in load order
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Property,
        RecordKind::PropertyGroup,
        RecordKind::Event,
    ];

    /// Canonical CSV columns, in output order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Property => &["property_name", "type", "constraints", "description", "usage"],
            RecordKind::PropertyGroup => &["group_name", "description", "properties"],
            RecordKind::Event => &[
                "event_name",
                "event_description",
                "event_table",
                "property_groups",
                "additional_properties",
                "notes",
            ],
        }
    }

    /// Column holding the record's unique name
    pub fn key_column(&self) -> &'static str {
        self.columns()[0]
    }

    /// Column the enclosing wiki section title is stamped into, if any
    pub fn section_field(&self) -> Option<&'static str> {
        match self {
            RecordKind::Event => Some("event_table"),
            _ => None,
        }
    }

    /// Source wiki page
    pub fn markdown_file(&self) -> &'static str {
        match self {
            RecordKind::Property => "Properties.md",
            RecordKind::PropertyGroup => "Property-Groups.md",
            RecordKind::Event => "Events.md",
        }
    }

    /// Canonical CSV file
    pub fn csv_file(&self) -> &'static str {
        match self {
            RecordKind::Property => "properties.csv",
            RecordKind::PropertyGroup => "property-groups.csv",
            RecordKind::Event => "events.csv",
        }
    }

    /// Output directory for generated modules
    pub fn module_dir(&self) -> &'static str {
        match self {
            RecordKind::Property => "properties",
            RecordKind::PropertyGroup => "property-groups",
            RecordKind::Event => "events",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordKind::Property => "Property",
            RecordKind::PropertyGroup => "Property group",
            RecordKind::Event => "Event",
        };
        f.write_str(label)
    }
}

/// One row of a spec table: column key to cell text, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell value for `key`, if the column is present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Cell value for `key`, or the empty string when absent
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Set a cell. An existing column keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
