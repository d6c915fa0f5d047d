//! Schema resolution
//!
//! Expands an event's property-group references and additional properties
//! into typed descriptors. Expansion is a faithful projection of what the
//! event declares: missing groups are left out, missing properties become
//! placeholders, and a property listed twice shows up twice.

use serde::Serialize;
use tracing::warn;

use crate::model::{Constraint, Event, Property, PropertyType};
use crate::repository::SpecRepository;

/// Description carried by placeholder descriptors
pub const PLACEHOLDER_DESCRIPTION: &str = "Property not found";

/// Typed view of a property as seen by an event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub constraints: Option<String>,
    pub description: String,
    #[serde(skip)]
    pub constraint: Constraint,
}

impl PropertyDescriptor {
    pub fn from_property(property: &Property) -> Self {
        Self {
            name: property.name.clone(),
            property_type: property.property_type.clone(),
            constraints: property.display_constraints().map(String::from),
            description: property.description.clone(),
            constraint: property.constraint.clone(),
        }
    }

    /// Stand-in for a name with no matching property
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: PropertyType::Unknown,
            constraints: None,
            description: PLACEHOLDER_DESCRIPTION.to_string(),
            constraint: Constraint::None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.property_type == PropertyType::Unknown && self.description == PLACEHOLDER_DESCRIPTION
    }
}

/// A property group expanded for one event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGroup {
    pub name: String,
    pub description: String,
    pub properties: Vec<PropertyDescriptor>,
}

/// An event's flattened schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedSchema {
    pub property_groups: Vec<ResolvedGroup>,
    pub additional_properties: Vec<PropertyDescriptor>,
}

impl ResolvedSchema {
    /// Every descriptor: groups' members in order, then additional properties
    pub fn descriptors(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.property_groups
            .iter()
            .flat_map(|g| g.properties.iter())
            .chain(self.additional_properties.iter())
    }

    /// Number of descriptors, duplicates and placeholders included
    pub fn property_count(&self) -> usize {
        self.property_groups.iter().map(|g| g.properties.len()).sum::<usize>()
            + self.additional_properties.len()
    }

    pub fn contains_property(&self, name: &str) -> bool {
        self.descriptors().any(|d| d.name == name)
    }
}

/// Expands events against a repository
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    repo: &'a SpecRepository,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(repo: &'a SpecRepository) -> Self {
        Self { repo }
    }

    /// Resolve a property name, falling back to a placeholder
    pub fn resolve_property(&self, name: &str) -> PropertyDescriptor {
        self.repo
            .property(name)
            .map(PropertyDescriptor::from_property)
            .unwrap_or_else(|| PropertyDescriptor::placeholder(name))
    }

    /// Expand an event's groups and additional properties
    pub fn resolve(&self, event: &Event) -> ResolvedSchema {
        let mut schema = ResolvedSchema::default();

        for group_name in &event.property_groups {
            let Some(group) = self.repo.property_group(group_name) else {
                warn!(event = %event.name, group = %group_name, "Omitting unknown property group");
                continue;
            };

            schema.property_groups.push(ResolvedGroup {
                name: group_name.clone(),
                description: group.description.clone(),
                properties: group
                    .properties
                    .iter()
                    .map(|name| self.resolve_property(name))
                    .collect(),
            });
        }

        schema.additional_properties = event
            .additional_properties
            .iter()
            .map(|name| self.resolve_property(name))
            .collect();

        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyGroup;

    fn property(name: &str, tag: &str) -> Property {
        Property {
            name: name.to_string(),
            property_type: PropertyType::parse(tag),
            constraints: None,
            constraint: Constraint::None,
            description: format!("{} description", name),
            usage: None,
        }
    }

    fn group(name: &str, members: &[&str]) -> PropertyGroup {
        PropertyGroup {
            name: name.to_string(),
            description: format!("{} group", name),
            properties: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn event(groups: &[&str], additional: &[&str]) -> Event {
        Event {
            name: "test_event".to_string(),
            description: String::new(),
            table: "Test Events".to_string(),
            property_groups: groups.iter().map(|g| g.to_string()).collect(),
            additional_properties: additional.iter().map(|p| p.to_string()).collect(),
            notes: None,
        }
    }

    fn repo() -> SpecRepository {
        SpecRepository::new(
            vec![property("user_id", "string"), property("email", "string"), property("step_number", "number")],
            vec![group("user_context", &["user_id", "email"]), group("drifted", &["user_id", "gone"])],
            vec![],
        )
    }

    #[test]
    fn test_resolve_groups_and_additional() {
        let repo = repo();
        let schema = SchemaResolver::new(&repo).resolve(&event(&["user_context"], &["step_number"]));

        assert_eq!(schema.property_groups.len(), 1);
        assert_eq!(schema.property_groups[0].description, "user_context group");
        let names: Vec<_> = schema.descriptors().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["user_id", "email", "step_number"]);
        assert_eq!(schema.additional_properties[0].property_type, PropertyType::Number);
    }

    #[test]
    fn test_unknown_group_omitted() {
        let repo = repo();
        let schema = SchemaResolver::new(&repo).resolve(&event(&["no_such_group"], &[]));
        assert!(schema.property_groups.is_empty());
        assert_eq!(schema.property_count(), 0);
    }

    #[test]
    fn test_unknown_member_becomes_placeholder() {
        let repo = repo();
        let schema = SchemaResolver::new(&repo).resolve(&event(&["drifted"], &["missing_extra"]));

        let gone = &schema.property_groups[0].properties[1];
        assert_eq!(gone.name, "gone");
        assert_eq!(gone.property_type, PropertyType::Unknown);
        assert_eq!(gone.constraints, None);
        assert_eq!(gone.description, "Property not found");
        assert!(schema.additional_properties[0].is_placeholder());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let repo = repo();
        let schema = SchemaResolver::new(&repo).resolve(&event(&["user_context", "drifted"], &["user_id"]));
        let user_ids = schema.descriptors().filter(|d| d.name == "user_id").count();
        assert_eq!(user_ids, 3);
        assert_eq!(schema.property_count(), 5);
    }

    #[test]
    fn test_placeholder_serialization() {
        let json = serde_json::to_value(PropertyDescriptor::placeholder("gone")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "gone",
                "type": "unknown",
                "constraints": null,
                "description": "Property not found"
            })
        );
    }
}
