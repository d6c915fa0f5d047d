//! Read-only resources addressed by `analytics://` URIs

use serde::Serialize;
use serde_json::Value;

use super::{get_event_implementation, EventArgs};
use crate::error::{Result, SpecError};
use crate::model::{Event, Property, PropertyGroup};
use crate::record::RecordKind;
use crate::repository::SpecRepository;
use crate::resolver::PropertyDescriptor;

const SCHEME: &str = "analytics://";
const SPECS_URI: &str = "analytics://specs";
const MIME_TYPE: &str = "application/json";

/// Listing entry for one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
}

impl ResourceDescriptor {
    fn new(uri: String, name: &str, description: &str) -> Self {
        Self {
            uri,
            name: name.to_string(),
            description: description.to_string(),
            mime_type: MIME_TYPE,
        }
    }
}

/// A parsed resource URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResourceUri<'a> {
    Specs,
    Record(RecordKind, &'a str),
}

impl<'a> ResourceUri<'a> {
    fn parse(uri: &'a str) -> Option<Self> {
        if uri == SPECS_URI {
            return Some(ResourceUri::Specs);
        }
        let path = uri.strip_prefix(SCHEME)?;
        RecordKind::ALL.into_iter().find_map(|kind| {
            path.strip_prefix(segment(kind))
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|name| ResourceUri::Record(kind, name))
        })
    }
}

fn segment(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Property => "properties",
        RecordKind::PropertyGroup => "property-groups",
        RecordKind::Event => "events",
    }
}

fn record_uri(kind: RecordKind, name: &str) -> String {
    format!("{}{}/{}", SCHEME, segment(kind), name)
}

/// The full spec plus one resource per event, property group and property
pub fn list_resources(repo: &SpecRepository) -> Vec<ResourceDescriptor> {
    let mut resources = vec![ResourceDescriptor::new(
        SPECS_URI.to_string(),
        "All Analytics Specs",
        "Complete analytics specification with all events, properties, and property groups",
    )];

    resources.extend(
        repo.events()
            .iter()
            .map(|e| ResourceDescriptor::new(record_uri(RecordKind::Event, &e.name), &e.name, &e.description)),
    );
    resources.extend(repo.property_groups().iter().map(|g| {
        ResourceDescriptor::new(record_uri(RecordKind::PropertyGroup, &g.name), &g.name, &g.description)
    }));
    resources.extend(repo.properties().iter().map(|p| {
        ResourceDescriptor::new(record_uri(RecordKind::Property, &p.name), &p.name, &p.description)
    }));

    resources
}

#[derive(Serialize)]
struct PropertyView<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    property_type: &'a str,
    constraints: Option<&'a str>,
    description: &'a str,
    usage: Option<&'a str>,
}

impl<'a> From<&'a Property> for PropertyView<'a> {
    fn from(p: &'a Property) -> Self {
        Self {
            name: &p.name,
            property_type: p.property_type.as_str(),
            constraints: p.constraints.as_deref(),
            description: &p.description,
            usage: p.usage.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct GroupView<'a> {
    name: &'a str,
    description: &'a str,
    properties: &'a [String],
}

impl<'a> From<&'a PropertyGroup> for GroupView<'a> {
    fn from(g: &'a PropertyGroup) -> Self {
        Self {
            name: &g.name,
            description: &g.description,
            properties: &g.properties,
        }
    }
}

#[derive(Serialize)]
struct EventView<'a> {
    name: &'a str,
    description: &'a str,
    table: &'a str,
    property_groups: &'a [String],
    additional_properties: &'a [String],
    notes: Option<&'a str>,
}

impl<'a> From<&'a Event> for EventView<'a> {
    fn from(e: &'a Event) -> Self {
        Self {
            name: &e.name,
            description: &e.description,
            table: &e.table,
            property_groups: &e.property_groups,
            additional_properties: &e.additional_properties,
            notes: e.notes.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct SpecsView<'a> {
    properties: Vec<PropertyView<'a>>,
    property_groups: Vec<GroupView<'a>>,
    events: Vec<EventView<'a>>,
}

/// Group members that do not resolve are listed by name only
#[derive(Serialize)]
#[serde(untagged)]
enum GroupMember<'a> {
    Known(PropertyDescriptor),
    Missing { name: &'a str },
}

#[derive(Serialize)]
struct GroupDetail<'a> {
    name: &'a str,
    description: &'a str,
    properties: Vec<GroupMember<'a>>,
}

/// Read a resource by URI
pub fn read_resource(repo: &SpecRepository, uri: &str) -> Result<Value> {
    let parsed = ResourceUri::parse(uri).ok_or_else(|| SpecError::UnknownResource(uri.to_string()))?;

    let content = match parsed {
        ResourceUri::Specs => serde_json::to_value(SpecsView {
            properties: repo.properties().iter().map(PropertyView::from).collect(),
            property_groups: repo.property_groups().iter().map(GroupView::from).collect(),
            events: repo.events().iter().map(EventView::from).collect(),
        })?,
        ResourceUri::Record(RecordKind::Event, name) => serde_json::to_value(get_event_implementation(
            repo,
            &EventArgs {
                event_name: name.to_string(),
            },
        )?)?,
        ResourceUri::Record(RecordKind::PropertyGroup, name) => {
            let group = repo.require_property_group(name)?;
            let properties = group
                .properties
                .iter()
                .map(|member| match repo.property(member) {
                    Some(p) => GroupMember::Known(PropertyDescriptor::from_property(p)),
                    None => GroupMember::Missing { name: member },
                })
                .collect();
            serde_json::to_value(GroupDetail {
                name: &group.name,
                description: &group.description,
                properties,
            })?
        }
        ResourceUri::Record(RecordKind::Property, name) => {
            serde_json::to_value(PropertyView::from(repo.require_property(name)?))?
        }
    };

    Ok(content)
}
