//! Tool catalogue and dispatch
//!
//! Each tool pairs a query operation with a JSON input schema. Arguments are
//! checked against that schema before they are decoded, so callers get every
//! problem with their arguments at once.

use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{
    get_event_implementation, get_property_details, get_related_events, search_events,
    validate_event_payload,
};
use crate::error::{Result, SpecError};
use crate::repository::SpecRepository;

/// The tools the query surface offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    GetEventImplementation,
    ValidateEventPayload,
    SearchEvents,
    GetPropertyDetails,
    GetRelatedEvents,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::GetEventImplementation,
        Tool::ValidateEventPayload,
        Tool::SearchEvents,
        Tool::GetPropertyDetails,
        Tool::GetRelatedEvents,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::GetEventImplementation => "get_event_implementation",
            Tool::ValidateEventPayload => "validate_event_payload",
            Tool::SearchEvents => "search_events",
            Tool::GetPropertyDetails => "get_property_details",
            Tool::GetRelatedEvents => "get_related_events",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::GetEventImplementation => {
                "Get complete event specification with all properties expanded. Use when implementing tracking code."
            }
            Tool::ValidateEventPayload => {
                "Validate a tracking implementation payload against the event spec. Returns errors, warnings, and valid fields."
            }
            Tool::SearchEvents => "Search for events by name, description, table, or property usage.",
            Tool::GetPropertyDetails => {
                "Get property definition and see where it is used across events and property groups."
            }
            Tool::GetRelatedEvents => "Find events in the same table/flow as a given event.",
        }
    }

    /// JSON Schema for the tool's arguments
    pub fn input_schema(&self) -> Value {
        match self {
            Tool::GetEventImplementation => json!({
                "type": "object",
                "properties": {
                    "event_name": { "type": "string", "description": "Name of the event to retrieve" }
                },
                "required": ["event_name"]
            }),
            Tool::ValidateEventPayload => json!({
                "type": "object",
                "properties": {
                    "event_name": { "type": "string", "description": "Name of the event to validate against" },
                    "payload": { "type": "object", "description": "The payload object to validate" }
                },
                "required": ["event_name", "payload"]
            }),
            Tool::SearchEvents => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search term for event name or description" },
                    "table": { "type": "string", "description": "Filter by event table" },
                    "has_property": { "type": "string", "description": "Filter events that include this property" }
                }
            }),
            Tool::GetPropertyDetails => json!({
                "type": "object",
                "properties": {
                    "property_name": { "type": "string", "description": "Name of the property to retrieve" }
                },
                "required": ["property_name"]
            }),
            Tool::GetRelatedEvents => json!({
                "type": "object",
                "properties": {
                    "event_name": {
                        "type": "string",
                        "description": "Name of the event to find related events for"
                    }
                },
                "required": ["event_name"]
            }),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

/// Listing entry for one tool
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Every tool with its description and input schema
pub fn tool_catalogue() -> Vec<ToolDefinition> {
    Tool::ALL.iter().map(Tool::definition).collect()
}

/// Check `args` against the tool's input schema, collecting every violation
fn check_arguments(tool: Tool, args: &Value) -> Result<()> {
    let invalid = |messages: Vec<String>| SpecError::InvalidArguments {
        tool: tool.name().to_string(),
        messages,
    };

    let schema = tool.input_schema();
    let compiled = JSONSchema::compile(&schema).map_err(|e| invalid(vec![e.to_string()]))?;

    let messages: Vec<String> = match compiled.validate(args) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.map(|e| e.to_string()).collect(),
    };

    if messages.is_empty() {
        Ok(())
    } else {
        Err(invalid(messages))
    }
}

/// Run a tool by name. Missing arguments (`null`) count as an empty object.
pub fn call_tool(repo: &SpecRepository, name: &str, args: Value) -> Result<Value> {
    let tool = Tool::from_name(name).ok_or_else(|| SpecError::UnknownTool(name.to_string()))?;
    let args = if args.is_null() { Value::Object(Map::new()) } else { args };

    check_arguments(tool, &args)?;
    debug!(tool = tool.name(), "calling tool");

    let result = match tool {
        Tool::GetEventImplementation => {
            serde_json::to_value(get_event_implementation(repo, &serde_json::from_value(args)?)?)?
        }
        Tool::ValidateEventPayload => {
            serde_json::to_value(validate_event_payload(repo, &serde_json::from_value(args)?)?)?
        }
        Tool::SearchEvents => serde_json::to_value(search_events(repo, &serde_json::from_value(args)?))?,
        Tool::GetPropertyDetails => {
            serde_json::to_value(get_property_details(repo, &serde_json::from_value(args)?)?)?
        }
        Tool::GetRelatedEvents => {
            serde_json::to_value(get_related_events(repo, &serde_json::from_value(args)?)?)?
        }
    };

    Ok(result)
}

/// Render a tool result as JSON, prefixed with the staleness warning if any
pub fn render_response(result: &Value, warning: Option<&str>, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(match warning {
        Some(warning) => format!("Warning: {}\n\n{}", warning, text),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> SpecRepository {
        SpecRepository::from_csv(
            "property_name,type,constraints,description,usage\n\
             permission_level,string,\"enum: viewer, editor, admin\",Permission,\n",
            "group_name,description,properties\n",
            "event_name,event_description,event_table,property_groups,additional_properties,notes\n\
             collaborator_invited,Invited someone,Project Events,-,permission_level,\n",
        )
        .unwrap()
    }

    #[test]
    fn test_catalogue_lists_all_tools() {
        let names: Vec<_> = tool_catalogue().iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "get_event_implementation",
                "validate_event_payload",
                "search_events",
                "get_property_details",
                "get_related_events",
            ]
        );
        let listing = serde_json::to_value(tool_catalogue()).unwrap();
        assert_eq!(listing[0]["inputSchema"]["required"], json!(["event_name"]));
    }

    #[test]
    fn test_call_validate() {
        let result = call_tool(
            &repo(),
            "validate_event_payload",
            json!({ "event_name": "collaborator_invited", "payload": { "permission_level": "owner" } }),
        )
        .unwrap();
        assert_eq!(result["valid"], json!(false));
        assert_eq!(result["errors"][0]["issue"], "Invalid enum value");
        assert_eq!(result["errors"][0]["expected"], json!(["viewer", "editor", "admin"]));
    }

    #[test]
    fn test_missing_required_argument() {
        let err = call_tool(&repo(), "validate_event_payload", json!({ "payload": {} })).unwrap_err();
        match err {
            SpecError::InvalidArguments { tool, messages } => {
                assert_eq!(tool, "validate_event_payload");
                assert_eq!(messages.len(), 1);
                assert!(messages[0].contains("event_name"));
            }
            other => panic!("Expected InvalidArguments, got {:?}", other),
        }
    }

    #[test]
    fn test_null_arguments_for_search() {
        let result = call_tool(&repo(), "search_events", Value::Null).unwrap();
        assert_eq!(result.as_array().map(Vec::len), Some(1));
        assert_eq!(result[0]["property_count"], 1);
    }

    #[test]
    fn test_unknown_tool() {
        let err = call_tool(&repo(), "drop_tables", json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: drop_tables");
    }

    #[test]
    fn test_render_response_with_warning() {
        let text = render_response(&json!({ "ok": true }), Some("Local repo is 2 commit(s) behind remote."), true).unwrap();
        assert!(text.starts_with("Warning: Local repo is 2 commit(s) behind remote.\n\n{"));
        assert_eq!(render_response(&json!(1), None, true).unwrap(), "1");
    }

    #[test]
    fn test_render_compact_response_keeps_warning() {
        let text = render_response(&json!({ "ok": true }), Some("Local repo is 1 commit(s) behind remote."), false).unwrap();
        assert_eq!(text, "Warning: Local repo is 1 commit(s) behind remote.\n\n{\"ok\":true}");
        assert_eq!(render_response(&json!({ "ok": true }), None, false).unwrap(), "{\"ok\":true}");
    }
}
