//! Payload validation
//!
//! Checks a tracking payload against an event's resolved schema. Type and
//! constraint violations are errors and make the payload invalid; unknown and
//! missing fields are only warnings and never affect `valid`.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{Constraint, PropertyType};
use crate::resolver::{PropertyDescriptor, ResolvedSchema};

/// Runtime shape of a payload value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Null => ValueKind::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Null => "null",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type or constraint violation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue")]
pub enum FieldError {
    #[serde(rename = "Type mismatch")]
    TypeMismatch {
        field: String,
        expected: PropertyType,
        got: String,
    },
    #[serde(rename = "Invalid enum value")]
    InvalidEnumValue {
        field: String,
        expected: Vec<String>,
        got: Value,
    },
    #[serde(rename = "Regex validation failed")]
    RegexMismatch {
        field: String,
        expected: String,
        got: Value,
    },
}

impl FieldError {
    pub fn field(&self) -> &str {
        match self {
            FieldError::TypeMismatch { field, .. }
            | FieldError::InvalidEnumValue { field, .. }
            | FieldError::RegexMismatch { field, .. } => field,
        }
    }
}

/// An unknown or missing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue")]
pub enum FieldWarning {
    #[serde(rename = "Unknown property not in spec")]
    UnknownProperty { field: String },
    #[serde(rename = "Missing property")]
    MissingProperty { field: String },
}

impl FieldWarning {
    pub fn field(&self) -> &str {
        match self {
            FieldWarning::UnknownProperty { field } | FieldWarning::MissingProperty { field } => field,
        }
    }
}

/// Outcome of validating one payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// True when there are no errors; warnings never affect it
    pub valid: bool,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<FieldWarning>,
    pub valid_fields: Vec<String>,
}

/// Expected fields for one payload, in first-declared order.
///
/// A name declared more than once keeps its first position but takes the
/// last declaration's descriptor.
struct Expectations<'a> {
    entries: Vec<(&'a PropertyDescriptor, bool)>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> Expectations<'a> {
    fn new(schema: &'a ResolvedSchema) -> Self {
        let mut entries: Vec<(&PropertyDescriptor, bool)> = Vec::new();
        let mut positions = HashMap::new();

        for descriptor in schema.descriptors() {
            match positions.get(descriptor.name.as_str()) {
                Some(&idx) => entries[idx] = (descriptor, false),
                None => {
                    positions.insert(descriptor.name.as_str(), entries.len());
                    entries.push((descriptor, false));
                }
            }
        }

        Self { entries, positions }
    }

    /// Mark `name` as provided, returning its descriptor if it was expected
    /// and not yet seen.
    fn take(&mut self, name: &str) -> Option<&'a PropertyDescriptor> {
        let idx = *self.positions.get(name)?;
        let (descriptor, seen) = &mut self.entries[idx];
        if *seen {
            return None;
        }
        *seen = true;
        Some(*descriptor)
    }

    fn unseen(&self) -> impl Iterator<Item = &'a PropertyDescriptor> + '_ {
        self.entries
            .iter()
            .filter(|(_, seen)| !seen)
            .map(|(descriptor, _)| *descriptor)
    }
}

/// Validates payloads against a resolved schema
#[derive(Debug, Clone, Copy)]
pub struct PayloadValidator<'a> {
    schema: &'a ResolvedSchema,
}

impl<'a> PayloadValidator<'a> {
    pub fn new(schema: &'a ResolvedSchema) -> Self {
        Self { schema }
    }

    pub fn validate(&self, payload: &Map<String, Value>) -> ValidationReport {
        let mut expected = Expectations::new(self.schema);
        let mut report = ValidationReport::default();

        for (key, value) in payload {
            let Some(descriptor) = expected.take(key) else {
                report.warnings.push(FieldWarning::UnknownProperty { field: key.clone() });
                continue;
            };

            match check_field(key, descriptor, value) {
                Some(error) => report.errors.push(error),
                None => report.valid_fields.push(key.clone()),
            }
        }

        for descriptor in expected.unseen() {
            report.warnings.push(FieldWarning::MissingProperty {
                field: descriptor.name.clone(),
            });
        }

        report.valid = report.errors.is_empty();
        report
    }
}

/// Type check, then constraint check if the type matched
fn check_field(field: &str, descriptor: &PropertyDescriptor, value: &Value) -> Option<FieldError> {
    let actual = ValueKind::of(value);
    let declared = &descriptor.property_type;

    if *declared != PropertyType::Unknown && declared.wire_kind() != actual.as_str() {
        return Some(FieldError::TypeMismatch {
            field: field.to_string(),
            expected: declared.clone(),
            got: actual.as_str().to_string(),
        });
    }

    match &descriptor.constraint {
        Constraint::None => None,
        Constraint::Enum(allowed) => {
            // Only strings can equal an allowed value; `1` never matches "1"
            let matched = match value {
                Value::String(s) => allowed.iter().any(|a| a == s),
                _ => false,
            };
            if matched {
                None
            } else {
                Some(FieldError::InvalidEnumValue {
                    field: field.to_string(),
                    expected: allowed.clone(),
                    got: value.clone(),
                })
            }
        }
        Constraint::Pattern { pattern, regex } => match regex {
            Some(regex) if !regex.is_match(&value_text(value)) => Some(FieldError::RegexMismatch {
                field: field.to_string(),
                expected: pattern.clone(),
                got: value.clone(),
            }),
            // Matching values and uncompilable patterns pass
            _ => None,
        },
    }
}

/// Text a pattern is checked against: strings as-is, anything else as JSON
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
