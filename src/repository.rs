//! Spec Repository
//!
//! Holds the loaded properties, property groups and events with name-keyed
//! indexes. A repository is immutable once built; reloading means building a
//! new one and swapping it into a [`SharedRepository`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::info;

use crate::codec;
use crate::error::{Result, SpecError};
use crate::model::{Event, Property, PropertyGroup};
use crate::record::{Record, RecordKind};

pub use crate::codec::split_multi_line;

/// Maximum number of "did you mean" suggestions on a lookup miss
const MAX_SUGGESTIONS: usize = 3;

/// The loaded analytics spec
#[derive(Debug, Clone, Default)]
pub struct SpecRepository {
    /// Directory the CSV sources were read from
    source_dir: Option<PathBuf>,
    properties: Vec<Property>,
    property_groups: Vec<PropertyGroup>,
    events: Vec<Event>,
    /// Name -> position; later duplicates overwrite earlier ones
    property_index: HashMap<String, usize>,
    group_index: HashMap<String, usize>,
    event_index: HashMap<String, usize>,
}

impl SpecRepository {
    /// Load the three canonical CSV files from `dir`.
    ///
    /// Every file must be present; there is no partial load.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        for kind in RecordKind::ALL {
            if !dir.join(kind.csv_file()).exists() {
                return Err(SpecError::MissingSource {
                    dir: dir.to_path_buf(),
                    file: kind.csv_file(),
                });
            }
        }

        let read = |kind: RecordKind| -> Result<Vec<Record>> {
            let content = fs::read_to_string(dir.join(kind.csv_file()))?;
            codec::decode(&content)
        };

        let mut repo = Self::from_records(
            &read(RecordKind::Property)?,
            &read(RecordKind::PropertyGroup)?,
            &read(RecordKind::Event)?,
        );
        repo.source_dir = Some(dir.to_path_buf());

        info!(
            properties = repo.properties.len(),
            property_groups = repo.property_groups.len(),
            events = repo.events.len(),
            dir = %dir.display(),
            "Loaded analytics spec"
        );

        Ok(repo)
    }

    /// Build from CSV text, one document per record kind
    pub fn from_csv(properties: &str, property_groups: &str, events: &str) -> Result<Self> {
        Ok(Self::from_records(
            &codec::decode(properties)?,
            &codec::decode(property_groups)?,
            &codec::decode(events)?,
        ))
    }

    /// Build from raw records
    pub fn from_records(properties: &[Record], property_groups: &[Record], events: &[Record]) -> Self {
        Self::new(
            properties.iter().map(Property::from_record).collect(),
            property_groups.iter().map(PropertyGroup::from_record).collect(),
            events.iter().map(Event::from_record).collect(),
        )
    }

    /// Build from typed records
    pub fn new(properties: Vec<Property>, property_groups: Vec<PropertyGroup>, events: Vec<Event>) -> Self {
        let property_index = index_by(&properties, |p| &p.name);
        let group_index = index_by(&property_groups, |g| &g.name);
        let event_index = index_by(&events, |e| &e.name);

        Self {
            source_dir: None,
            properties,
            property_groups,
            events,
            property_index,
            group_index,
            event_index,
        }
    }

    /// Directory the repository was loaded from, if any
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    /// All properties in source order
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// All property groups in source order
    pub fn property_groups(&self) -> &[PropertyGroup] {
        &self.property_groups
    }

    /// All events in source order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get a property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.property_index.get(name).map(|&idx| &self.properties[idx])
    }

    /// Get a property group by name
    pub fn property_group(&self, name: &str) -> Option<&PropertyGroup> {
        self.group_index.get(name).map(|&idx| &self.property_groups[idx])
    }

    /// Get an event by name
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.event_index.get(name).map(|&idx| &self.events[idx])
    }

    /// Get a property or fail with suggestions
    pub fn require_property(&self, name: &str) -> Result<&Property> {
        self.property(name)
            .ok_or_else(|| self.not_found(RecordKind::Property, name))
    }

    /// Get a property group or fail with suggestions
    pub fn require_property_group(&self, name: &str) -> Result<&PropertyGroup> {
        self.property_group(name)
            .ok_or_else(|| self.not_found(RecordKind::PropertyGroup, name))
    }

    /// Get an event or fail with suggestions
    pub fn require_event(&self, name: &str) -> Result<&Event> {
        self.event(name)
            .ok_or_else(|| self.not_found(RecordKind::Event, name))
    }

    /// Names of the given kind closest to `query`, best first
    pub fn suggest(&self, kind: RecordKind, query: &str) -> Vec<String> {
        let matcher = SkimMatcherV2::default();
        let names: Vec<&str> = match kind {
            RecordKind::Property => self.properties.iter().map(|p| p.name.as_str()).collect(),
            RecordKind::PropertyGroup => self.property_groups.iter().map(|g| g.name.as_str()).collect(),
            RecordKind::Event => self.events.iter().map(|e| e.name.as_str()).collect(),
        };

        let mut scored: Vec<(i64, &str)> = names
            .into_iter()
            .filter_map(|name| matcher.fuzzy_match(name, query).map(|score| (score, name)))
            .collect();

        // Sort by score descending, then name for stable output
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored.dedup_by(|a, b| a.1 == b.1);

        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    fn not_found(&self, kind: RecordKind, name: &str) -> SpecError {
        SpecError::NotFound {
            kind,
            name: name.to_string(),
            suggestions: self.suggest(kind, name),
        }
    }
}

fn index_by<T>(items: &[T], name: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| (name(item).clone(), idx))
        .collect()
}

/// A repository reference that can be swapped atomically.
///
/// Readers take an [`Arc`] snapshot and keep using it even while a reload
/// installs a newer repository.
#[derive(Debug, Default)]
pub struct SharedRepository {
    current: RwLock<Arc<SpecRepository>>,
}

impl SharedRepository {
    pub fn new(repo: SpecRepository) -> Self {
        Self {
            current: RwLock::new(Arc::new(repo)),
        }
    }

    /// The repository as of now
    pub fn snapshot(&self) -> Arc<SpecRepository> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a new repository, returning the previous one
    pub fn replace(&self, repo: SpecRepository) -> Arc<SpecRepository> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(repo))
    }

    /// Load `dir` into a fresh repository and swap it in.
    ///
    /// On failure the current repository stays in place.
    pub fn reload(&self, dir: impl AsRef<Path>) -> Result<()> {
        let repo = SpecRepository::load(dir)?;
        self.replace(repo);
        Ok(())
    }
}
