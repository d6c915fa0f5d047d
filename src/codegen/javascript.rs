//! JavaScript module emitter
//!
//! Each record becomes an ES module with a JSDoc typedef, a named export and
//! a default export. Index modules re-export a directory's items and collect
//! them into an `all` object.

use super::names::to_identifier;
use crate::model::{Event, Property, PropertyGroup};

const PROPERTY_TYPEDEF: &str = "/**
 * @typedef {Object} Property
 * @property {string} name
 * @property {string} type
 * @property {string} [constraints]
 * @property {string} description
 * @property {string} [usage]
 */
";

const GROUP_TYPEDEF: &str = "/**
 * @typedef {Object} PropertyGroup
 * @property {string} name
 * @property {string} description
 * @property {string[]} properties - Property names included in this group
 */
";

const EVENT_TYPEDEF: &str = "/**
 * @typedef {Object} Event
 * @property {string} event_name
 * @property {string} description
 * @property {string} table
 * @property {string[]} property_groups - Names of property groups included
 * @property {string[]} additional_properties - Names of additional properties
 * @property {string} [notes]
 */
";

/// Single-quoted JavaScript string literal
fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Array literal with one item per line, at two-space indentation
fn js_array(items: &[String]) -> String {
    let body = items
        .iter()
        .map(|item| js_string(item))
        .collect::<Vec<_>>()
        .join(",\n    ");
    format!("[\n    {}\n  ]", body)
}

fn export_footer(output: &mut String, identifier: &str) {
    output.push_str("};\n\n");
    output.push_str(&format!("export default {};\n", identifier));
}

/// Module for one property
pub fn emit_property(property: &Property) -> String {
    let identifier = to_identifier(&property.name);
    let constraints = property
        .display_constraints()
        .filter(|c| !c.trim().is_empty())
        .map(js_string)
        .unwrap_or_else(|| "null".to_string());

    let mut output = String::from(PROPERTY_TYPEDEF);
    output.push('\n');
    output.push_str(&format!("/**\n * {} property definition\n", property.name));
    output.push_str(&format!(" * {}\n *\n * @type {{Property}}\n */\n", property.description));
    output.push_str(&format!("export const {} = {{\n", identifier));
    output.push_str(&format!("  name: {},\n", js_string(&property.name)));
    output.push_str(&format!("  type: {},\n", js_string(property.property_type.as_str())));
    output.push_str(&format!("  constraints: {},\n", constraints));
    output.push_str(&format!("  description: {},\n", js_string(&property.description)));
    output.push_str(&format!("  usage: {}\n", js_string(property.usage.as_deref().unwrap_or(""))));
    export_footer(&mut output, &identifier);
    output
}

/// Module for one property group
pub fn emit_group(group: &PropertyGroup) -> String {
    let identifier = to_identifier(&group.name);

    let mut output = String::from(GROUP_TYPEDEF);
    output.push('\n');
    output.push_str(&format!("/**\n * {} property group\n", group.name));
    output.push_str(&format!(" * {}\n *\n * @type {{PropertyGroup}}\n */\n", group.description));
    output.push_str(&format!("export const {} = {{\n", identifier));
    output.push_str(&format!("  name: {},\n", js_string(&group.name)));
    output.push_str(&format!("  description: {},\n", js_string(&group.description)));
    output.push_str(&format!("  properties: {}\n", js_array(&group.properties)));
    export_footer(&mut output, &identifier);
    output
}

/// Module for one event
pub fn emit_event(event: &Event) -> String {
    let identifier = to_identifier(&event.name);
    let groups = if event.property_groups.is_empty() {
        "none".to_string()
    } else {
        event.property_groups.join(", ")
    };
    let notes = event.notes.as_deref().unwrap_or("").replace('\n', " ");

    let mut output = String::from(EVENT_TYPEDEF);
    output.push('\n');
    output.push_str(&format!("/**\n * {} event\n", event.name));
    output.push_str(&format!(" * {}\n *\n", event.description));
    output.push_str(&format!(" * Table: {}\n", event.table));
    output.push_str(&format!(" * Property groups: {}\n *\n * @type {{Event}}\n */\n", groups));
    output.push_str(&format!("export const {} = {{\n", identifier));
    output.push_str(&format!("  event_name: {},\n", js_string(&event.name)));
    output.push_str(&format!("  description: {},\n", js_string(&event.description)));
    output.push_str(&format!("  table: {},\n", js_string(&event.table)));
    output.push_str(&format!("  property_groups: {},\n", js_array(&event.property_groups)));
    output.push_str(&format!("  additional_properties: {},\n", js_array(&event.additional_properties)));
    output.push_str(&format!("  notes: {}\n", js_string(&notes)));
    export_footer(&mut output, &identifier);
    output
}

fn emit_exports(output: &mut String, identifiers: &[String]) {
    let list = identifiers.join(",\n  ");
    output.push_str(&format!("export {{\n  {}\n}};\n\n", list));
    output.push_str(&format!("export const all = {{\n  {}\n}};\n\n", list));
    output.push_str("export default all;\n");
}

/// Index module for a directory of item modules named after `items`
pub fn emit_index(title: &str, items: &[&str]) -> String {
    let identifiers: Vec<String> = items.iter().map(|name| to_identifier(name)).collect();

    let mut output = String::new();
    output.push_str(&format!("/**\n * {} index\n * Auto-generated - do not edit\n */\n\n", title));
    for (name, identifier) in items.iter().zip(&identifiers) {
        output.push_str(&format!("import {{ {} }} from './{}.js';\n", identifier, name));
    }
    output.push('\n');
    emit_exports(&mut output, &identifiers);
    output
}

/// Root events index importing each table directory's default export
pub fn emit_events_root_index(table_dirs: &[String]) -> String {
    let identifiers: Vec<String> = table_dirs.iter().map(|dir| to_identifier(dir)).collect();

    let mut output = String::from("/**\n * Events index\n * Auto-generated - do not edit\n */\n\n");
    for (dir, identifier) in table_dirs.iter().zip(&identifiers) {
        output.push_str(&format!("import {} from './{}/index.js';\n", identifier, dir));
    }
    output.push('\n');
    emit_exports(&mut output, &identifiers);
    output
}
