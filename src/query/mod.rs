//! Query operations over a loaded spec
//!
//! These are the five lookups the tool surface exposes. Each takes a small
//! argument struct and returns a serializable result; unknown names are
//! `NotFound` errors, while payload problems are reported inside the
//! validation result.

pub mod resources;
pub mod tools;

pub use resources::{list_resources, read_resource, ResourceDescriptor};
pub use tools::{call_tool, render_response, tool_catalogue, ToolDefinition};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::repository::SpecRepository;
use crate::resolver::{PropertyDescriptor, ResolvedGroup, SchemaResolver};
use crate::validator::{PayloadValidator, ValidationReport};

/// Arguments naming a single event
#[derive(Debug, Clone, Deserialize)]
pub struct EventArgs {
    pub event_name: String,
}

/// Arguments for payload validation
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatePayloadArgs {
    pub event_name: String,
    pub payload: Map<String, Value>,
}

/// Optional filters for event search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchEventsArgs {
    /// Substring of the event name or description
    #[serde(default)]
    pub query: Option<String>,
    /// Substring of the event table
    #[serde(default)]
    pub table: Option<String>,
    /// Exact property name the event must include
    #[serde(default)]
    pub has_property: Option<String>,
}

/// Arguments naming a single property
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyArgs {
    pub property_name: String,
}

/// Everything needed to implement tracking for one event
#[derive(Debug, Clone, Serialize)]
pub struct EventImplementation {
    pub event: String,
    pub description: String,
    pub table: String,
    pub notes: Option<String>,
    pub property_groups: Vec<ResolvedGroup>,
    pub additional_properties: Vec<PropertyDescriptor>,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub event_name: String,
    pub description: String,
    pub table: String,
    pub property_count: usize,
}

/// A property and everywhere it is referenced
#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetails {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub constraints: Option<String>,
    pub description: String,
    pub usage: Option<String>,
    pub used_in_groups: Vec<String>,
    pub used_in_events_directly: Vec<String>,
    pub used_in_events_via_groups: Vec<String>,
}

/// An event in the same table as the requested one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedEvent {
    pub event_name: String,
    pub description: String,
}

/// Events sharing a table
#[derive(Debug, Clone, Serialize)]
pub struct RelatedEvents {
    pub event: String,
    pub table: String,
    pub related_events: Vec<RelatedEvent>,
}

/// Complete event spec with all property groups expanded
pub fn get_event_implementation(repo: &SpecRepository, args: &EventArgs) -> Result<EventImplementation> {
    let event = repo.require_event(&args.event_name)?;
    let schema = SchemaResolver::new(repo).resolve(event);

    Ok(EventImplementation {
        event: event.name.clone(),
        description: event.description.clone(),
        table: event.table.clone(),
        notes: event.notes.clone(),
        property_groups: schema.property_groups,
        additional_properties: schema.additional_properties,
    })
}

/// Validate a tracking payload against an event's expanded schema
pub fn validate_event_payload(repo: &SpecRepository, args: &ValidatePayloadArgs) -> Result<ValidationReport> {
    let event = repo.require_event(&args.event_name)?;
    let schema = SchemaResolver::new(repo).resolve(event);
    Ok(PayloadValidator::new(&schema).validate(&args.payload))
}

/// Filter events by name/description, table, and property usage
pub fn search_events(repo: &SpecRepository, args: &SearchEventsArgs) -> Vec<EventSummary> {
    let resolver = SchemaResolver::new(repo);
    let query = non_empty(&args.query).map(str::to_lowercase);
    let table = non_empty(&args.table).map(str::to_lowercase);
    let has_property = non_empty(&args.has_property);

    repo.events()
        .iter()
        .filter(|e| {
            query.as_deref().map_or(true, |q| {
                e.name.to_lowercase().contains(q) || e.description.to_lowercase().contains(q)
            })
        })
        .filter(|e| table.as_deref().map_or(true, |t| e.table.to_lowercase().contains(t)))
        .filter_map(|e| {
            let schema = resolver.resolve(e);
            if has_property.map_or(true, |p| schema.contains_property(p)) {
                Some(EventSummary {
                    event_name: e.name.clone(),
                    description: e.description.clone(),
                    table: e.table.clone(),
                    property_count: schema.property_count(),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Property definition plus the groups and events that use it
pub fn get_property_details(repo: &SpecRepository, args: &PropertyArgs) -> Result<PropertyDetails> {
    let name = args.property_name.as_str();
    let property = repo.require_property(name)?;

    let used_in_groups: Vec<String> = repo
        .property_groups()
        .iter()
        .filter(|g| g.contains(name))
        .map(|g| g.name.clone())
        .collect();

    let used_in_events_directly = repo
        .events()
        .iter()
        .filter(|e| e.uses_property_directly(name))
        .map(|e| e.name.clone())
        .collect();

    let used_in_events_via_groups = repo
        .events()
        .iter()
        .filter(|e| used_in_groups.iter().any(|g| e.uses_group(g)))
        .map(|e| e.name.clone())
        .collect();

    Ok(PropertyDetails {
        name: property.name.clone(),
        property_type: property.property_type.to_string(),
        constraints: property.display_constraints().map(String::from),
        description: property.description.clone(),
        usage: property.usage.clone(),
        used_in_groups,
        used_in_events_directly,
        used_in_events_via_groups,
    })
}

/// Other events declared in the same table
pub fn get_related_events(repo: &SpecRepository, args: &EventArgs) -> Result<RelatedEvents> {
    let event = repo.require_event(&args.event_name)?;

    let related_events = repo
        .events()
        .iter()
        .filter(|e| e.table == event.table && e.name != args.event_name)
        .map(|e| RelatedEvent {
            event_name: e.name.clone(),
            description: e.description.clone(),
        })
        .collect();

    Ok(RelatedEvents {
        event: args.event_name.clone(),
        table: event.table.clone(),
        related_events,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
