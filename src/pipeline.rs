//! Build pipeline: wiki markdown -> canonical CSV -> JavaScript modules

use std::fs;
use std::path::{Path, PathBuf};

use similar::TextDiff;
use tracing::info;

use crate::codec;
use crate::codegen;
use crate::error::{Result, SpecError};
use crate::markdown::parse_document;
use crate::record::{Record, RecordKind};
use crate::repository::SpecRepository;

/// Parsed wiki records and counts from a CSV transform
#[derive(Debug, Clone, Default)]
pub struct CsvSummary {
    pub properties: Vec<Record>,
    pub property_groups: Vec<Record>,
    pub events: Vec<Record>,
}

impl CsvSummary {
    pub fn records(&self, kind: RecordKind) -> &[Record] {
        match kind {
            RecordKind::Property => &self.properties,
            RecordKind::PropertyGroup => &self.property_groups,
            RecordKind::Event => &self.events,
        }
    }
}

/// Counts from a JavaScript generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsSummary {
    pub properties: usize,
    pub groups: usize,
    pub events: usize,
    pub tables: usize,
}

/// A canonical CSV file that no longer matches the wiki
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleFile {
    pub path: PathBuf,
    /// Unified diff from the file on disk to the regenerated text
    pub diff: String,
}

fn read_markdown(wiki_dir: &Path, kind: RecordKind) -> Result<Vec<Record>> {
    let path = wiki_dir.join(kind.markdown_file());
    if !path.exists() {
        return Err(SpecError::MissingSource {
            dir: wiki_dir.to_path_buf(),
            file: kind.markdown_file(),
        });
    }
    let content = fs::read_to_string(&path)?;
    Ok(parse_document(&content, kind))
}

/// Parse the three wiki pages
pub fn parse_wiki(wiki_dir: &Path) -> Result<CsvSummary> {
    Ok(CsvSummary {
        properties: read_markdown(wiki_dir, RecordKind::Property)?,
        property_groups: read_markdown(wiki_dir, RecordKind::PropertyGroup)?,
        events: read_markdown(wiki_dir, RecordKind::Event)?,
    })
}

/// CSV text for each kind, in load order
fn render_csv(summary: &CsvSummary) -> Result<Vec<(RecordKind, String)>> {
    RecordKind::ALL
        .into_iter()
        .map(|kind| Ok((kind, codec::encode(summary.records(kind), kind.columns())?)))
        .collect()
}

/// Parse the wiki and write the three canonical CSV files
pub fn transform_wiki_to_csv(wiki_dir: &Path, csv_dir: &Path) -> Result<CsvSummary> {
    let summary = parse_wiki(wiki_dir)?;
    fs::create_dir_all(csv_dir)?;

    for (kind, text) in render_csv(&summary)? {
        fs::write(csv_dir.join(kind.csv_file()), text)?;
    }

    info!(
        properties = summary.properties.len(),
        property_groups = summary.property_groups.len(),
        events = summary.events.len(),
        dir = %csv_dir.display(),
        "Wrote canonical CSV"
    );
    Ok(summary)
}

/// Load the CSV files and regenerate the JavaScript module tree
pub fn generate_javascript(csv_dir: &Path, js_dir: &Path) -> Result<JsSummary> {
    let repo = SpecRepository::load(csv_dir)?;
    let modules = codegen::generate(&repo);
    codegen::write_modules(&modules, js_dir)?;

    Ok(JsSummary {
        properties: modules.properties,
        groups: modules.groups,
        events: modules.events,
        tables: modules.tables,
    })
}

/// Compare the CSV files on disk with what the wiki would produce.
///
/// Returns one entry per file that differs or is missing; an empty result
/// means the CSV is current.
pub fn check_csv(wiki_dir: &Path, csv_dir: &Path) -> Result<Vec<StaleFile>> {
    let summary = parse_wiki(wiki_dir)?;
    let mut stale = Vec::new();

    for (kind, expected) in render_csv(&summary)? {
        let path = csv_dir.join(kind.csv_file());
        let current = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };

        if current != expected {
            let name = kind.csv_file();
            let diff = TextDiff::from_lines(&current, &expected)
                .unified_diff()
                .context_radius(3)
                .header(&format!("a/{}", name), &format!("b/{}", name))
                .to_string();
            stale.push(StaleFile { path, diff });
        }
    }

    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PROPERTIES_MD: &str = "## Identity\n\n\
        | Property Name | Type | Constraints | Description |\n\
        |---|---|---|---|\n\
        | user_id | string | - | Unique id |\n";
    const GROUPS_MD: &str = "## Groups\n\n\
        | Group Name | Description | Properties |\n\
        |---|---|---|\n\
        | user_context | Who | user_id |\n";
    const EVENTS_MD: &str = "## Registration Events\n\n\
        | Event Name | Event Description | Property Groups | Additional Properties | Notes |\n\
        |---|---|---|---|---|\n\
        | signup | Signed up | user_context | - | |\n";

    fn write_wiki(dir: &Path) {
        fs::write(dir.join("Properties.md"), PROPERTIES_MD).unwrap();
        fs::write(dir.join("Property-Groups.md"), GROUPS_MD).unwrap();
        fs::write(dir.join("Events.md"), EVENTS_MD).unwrap();
    }

    #[test]
    fn test_transform_writes_csv() {
        let wiki = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_wiki(wiki.path());
        let csv_dir = out.path().join("specs/csv");

        let summary = transform_wiki_to_csv(wiki.path(), &csv_dir).unwrap();
        assert_eq!(summary.events.len(), 1);

        let events = fs::read_to_string(csv_dir.join("events.csv")).unwrap();
        assert_eq!(
            events,
            "event_name,event_description,event_table,property_groups,additional_properties,notes\n\
             signup,Signed up,Registration Events,user_context,-,\n"
        );
    }

    #[test]
    fn test_missing_wiki_page() {
        let wiki = tempdir().unwrap();
        match parse_wiki(wiki.path()) {
            Err(SpecError::MissingSource { file, .. }) => assert_eq!(file, "Properties.md"),
            other => panic!("Expected MissingSource, got {:?}", other),
        }
    }

    #[test]
    fn test_check_csv_reports_stale_files() {
        let wiki = tempdir().unwrap();
        let csv = tempdir().unwrap();
        write_wiki(wiki.path());
        transform_wiki_to_csv(wiki.path(), csv.path()).unwrap();
        assert!(check_csv(wiki.path(), csv.path()).unwrap().is_empty());

        fs::write(
            wiki.path().join("Events.md"),
            EVENTS_MD.replace("Signed up", "User signed up"),
        )
        .unwrap();

        let stale = check_csv(wiki.path(), csv.path()).unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].path, csv.path().join("events.csv"));
        assert!(stale[0].diff.contains("-signup,Signed up,"));
        assert!(stale[0].diff.contains("+signup,User signed up,"));
    }

    #[test]
    fn test_generate_javascript_from_csv() {
        let wiki = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_wiki(wiki.path());
        let csv_dir = out.path().join("csv");
        let js_dir = out.path().join("js");

        transform_wiki_to_csv(wiki.path(), &csv_dir).unwrap();
        let summary = generate_javascript(&csv_dir, &js_dir).unwrap();

        assert_eq!(
            summary,
            JsSummary {
                properties: 1,
                groups: 1,
                events: 1,
                tables: 1,
            }
        );
        assert!(js_dir.join("events/registration/signup.js").exists());
    }
}
