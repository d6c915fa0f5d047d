//! Code Generation
//!
//! Renders a loaded spec as a tree of JavaScript modules:
//!
//! ```text
//! properties/<name>.js          + index.js
//! property-groups/<name>.js     + index.js
//! events/<table-dir>/<name>.js  + index.js per table
//! events/index.js
//! ```
//!
//! Generation is pure; [`write_modules`] is the only part that touches disk.

pub mod javascript;
pub mod names;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::model::Event;
use crate::record::RecordKind;
use crate::repository::SpecRepository;

pub use names::{to_directory_name, to_identifier, UNCATEGORIZED};

/// One rendered module, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    fn new(path: PathBuf, contents: String) -> Self {
        Self { path, contents }
    }
}

/// The full module tree plus counts for reporting
#[derive(Debug, Clone, Default)]
pub struct GeneratedModules {
    pub files: Vec<GeneratedFile>,
    pub properties: usize,
    pub groups: usize,
    pub events: usize,
    pub tables: usize,
}

impl GeneratedModules {
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path.as_ref())
    }
}

/// Events bucketed by table directory, in first-seen order
struct TableBucket<'a> {
    dir: String,
    title: &'a str,
    events: Vec<&'a Event>,
}

fn bucket_by_table(events: &[Event]) -> Vec<TableBucket<'_>> {
    let mut buckets: Vec<TableBucket<'_>> = Vec::new();
    for event in events {
        let title = names::table_or_default(&event.table);
        let dir = to_directory_name(title);
        match buckets.iter_mut().find(|b| b.dir == dir) {
            Some(bucket) => bucket.events.push(event),
            None => buckets.push(TableBucket {
                dir,
                title,
                events: vec![event],
            }),
        }
    }
    buckets
}

/// Render every module for `repo`
pub fn generate(repo: &SpecRepository) -> GeneratedModules {
    let mut files = Vec::new();

    let properties_dir = PathBuf::from(RecordKind::Property.module_dir());
    for property in repo.properties() {
        files.push(GeneratedFile::new(
            properties_dir.join(format!("{}.js", property.name)),
            javascript::emit_property(property),
        ));
    }
    let names: Vec<&str> = repo.properties().iter().map(|p| p.name.as_str()).collect();
    files.push(GeneratedFile::new(
        properties_dir.join("index.js"),
        javascript::emit_index("Properties", &names),
    ));

    let groups_dir = PathBuf::from(RecordKind::PropertyGroup.module_dir());
    for group in repo.property_groups() {
        files.push(GeneratedFile::new(
            groups_dir.join(format!("{}.js", group.name)),
            javascript::emit_group(group),
        ));
    }
    let names: Vec<&str> = repo.property_groups().iter().map(|g| g.name.as_str()).collect();
    files.push(GeneratedFile::new(
        groups_dir.join("index.js"),
        javascript::emit_index("Property Groups", &names),
    ));

    let events_dir = PathBuf::from(RecordKind::Event.module_dir());
    let buckets = bucket_by_table(repo.events());
    for bucket in &buckets {
        let table_dir = events_dir.join(&bucket.dir);
        for event in &bucket.events {
            files.push(GeneratedFile::new(
                table_dir.join(format!("{}.js", event.name)),
                javascript::emit_event(event),
            ));
        }
        let names: Vec<&str> = bucket.events.iter().map(|e| e.name.as_str()).collect();
        files.push(GeneratedFile::new(
            table_dir.join("index.js"),
            javascript::emit_index(bucket.title, &names),
        ));
    }
    let dirs: Vec<String> = buckets.iter().map(|b| b.dir.clone()).collect();
    files.push(GeneratedFile::new(
        events_dir.join("index.js"),
        javascript::emit_events_root_index(&dirs),
    ));

    GeneratedModules {
        files,
        properties: repo.properties().len(),
        groups: repo.property_groups().len(),
        events: repo.events().len(),
        tables: buckets.len(),
    }
}

/// Write modules under `out_dir`, replacing the three module directories
pub fn write_modules(modules: &GeneratedModules, out_dir: &Path) -> Result<()> {
    for kind in RecordKind::ALL {
        let dir = out_dir.join(kind.module_dir());
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
    }

    for file in &modules.files {
        let path = out_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.contents)?;
    }

    info!(
        properties = modules.properties,
        groups = modules.groups,
        events = modules.events,
        tables = modules.tables,
        dir = %out_dir.display(),
        "Generated JavaScript modules"
    );
    Ok(())
}
