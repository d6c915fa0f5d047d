//! Error types for the analytics spec tooling

use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordKind;

/// Result type for spec operations
pub type Result<T> = std::result::Result<T, SpecError>;

/// Analytics spec errors
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("{kind} '{name}' not found{}", suggestion_hint(.suggestions))]
    NotFound {
        kind: RecordKind,
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Missing source: {file} not found in {}. Run the transform first.", .dir.display())]
    MissingSource { dir: PathBuf, file: &'static str },

    #[error("Wiki source not found (looked in {})", display_paths(.0))]
    SourceNotFound(Vec<PathBuf>),

    #[error("Invalid arguments for {tool}: {}", .messages.join("; "))]
    InvalidArguments { tool: String, messages: Vec<String> },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown resource URI: {0}")]
    UnknownResource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl SpecError {
    /// Build a `NotFound` error without suggestions
    pub fn not_found(kind: RecordKind, name: impl Into<String>) -> Self {
        SpecError::NotFound {
            kind,
            name: name.into(),
            suggestions: Vec::new(),
        }
    }

    /// Whether this error is a lookup miss rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, SpecError::NotFound { .. })
    }
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = SpecError::not_found(RecordKind::Event, "signup");
        assert_eq!(err.to_string(), "Event 'signup' not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_not_found_with_suggestions() {
        let err = SpecError::NotFound {
            kind: RecordKind::Property,
            name: "user".to_string(),
            suggestions: vec!["user_id".to_string(), "user_tier".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Property 'user' not found (did you mean: user_id, user_tier?)"
        );
    }
}
