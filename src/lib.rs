//! Analytics Event Specs
//!
//! Tooling for an analytics tracking plan maintained as wiki markdown tables.
//! The wiki is parsed into canonical CSV, the CSV is loaded into an in-memory
//! repository, and the repository answers implementation questions and
//! validates tracking payloads.
//!
//! ## Features
//!
//! - **Wiki parsing**: `## ` sections holding pipe tables, `<br>` line breaks
//! - **Canonical CSV**: stable column order, minimal quoting, `-` for empty lists
//! - **Schema resolution**: events expanded through their property groups
//! - **Payload validation**: type, enum and regex checks with structured findings
//! - **Query surface**: five JSON tools plus `analytics://` resources
//! - **Code generation**: one JavaScript module per property, group and event
//!
//! ## Layout
//!
//! ```text
//! wiki/
//! ├── Properties.md
//! ├── Property-Groups.md
//! └── Events.md
//! specs/
//! ├── csv/
//! │   ├── properties.csv
//! │   ├── property-groups.csv
//! │   └── events.csv
//! └── javascript/
//!     ├── properties/
//!     ├── property-groups/
//!     └── events/<table>/
//! ```

pub mod codec;
pub mod codegen;
pub mod config;
pub mod error;
pub mod markdown;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod repository;
pub mod resolver;
pub mod upstream;
pub mod validator;

pub use config::SpecsConfig;
pub use error::{Result, SpecError};
pub use model::{Constraint, Event, Property, PropertyGroup, PropertyType};
pub use pipeline::{check_csv, generate_javascript, transform_wiki_to_csv, CsvSummary, JsSummary, StaleFile};
pub use record::{Record, RecordKind};
pub use repository::{SharedRepository, SpecRepository};
pub use resolver::{PropertyDescriptor, ResolvedGroup, ResolvedSchema, SchemaResolver};
pub use upstream::{staleness_warning, upstream_status, UpstreamStatus};
pub use validator::{FieldError, FieldWarning, PayloadValidator, ValidationReport};
