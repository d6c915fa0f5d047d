//! Configuration management for the analytics spec tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (analytics-specs.toml)
//! - Environment variables (ANALYTICS_SPECS__*)
//!
//! ## Example config file (analytics-specs.toml):
//! ```toml
//! [paths]
//! wiki_dir = "wiki"
//! wiki_fallback_dir = "wiki-examples"
//! csv_dir = "specs/csv"
//! javascript_dir = "specs/javascript"
//!
//! [query]
//! check_upstream = true
//! pretty = true
//! ```
//!
//! Relative paths are resolved against the project root handed to the
//! accessors, not the process working directory.

use std::path::{Path, PathBuf};

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecError};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecsConfig {
    /// Source and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Query surface settings
    #[serde(default)]
    pub query: QueryConfig,
}

/// Source and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Wiki checkout holding the markdown tables
    #[serde(default = "default_wiki_dir")]
    pub wiki_dir: PathBuf,

    /// Used when `wiki_dir` does not exist
    #[serde(default = "default_wiki_fallback_dir")]
    pub wiki_fallback_dir: PathBuf,

    /// Canonical CSV files
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,

    /// Generated JavaScript modules
    #[serde(default = "default_javascript_dir")]
    pub javascript_dir: PathBuf,
}

/// Query surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Warn when the local checkout is behind its upstream
    #[serde(default = "default_true")]
    pub check_upstream: bool,

    /// Pretty-print JSON responses
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_wiki_dir() -> PathBuf {
    PathBuf::from("wiki")
}

fn default_wiki_fallback_dir() -> PathBuf {
    PathBuf::from("wiki-examples")
}

fn default_csv_dir() -> PathBuf {
    PathBuf::from("specs/csv")
}

fn default_javascript_dir() -> PathBuf {
    PathBuf::from("specs/javascript")
}

fn default_true() -> bool {
    true
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            wiki_dir: default_wiki_dir(),
            wiki_fallback_dir: default_wiki_fallback_dir(),
            csv_dir: default_csv_dir(),
            javascript_dir: default_javascript_dir(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            check_upstream: true,
            pretty: true,
        }
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

impl SpecsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "analytics-specs.toml",
            ".analytics-specs.toml",
            "config/analytics-specs.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("dev", "analytics", "analytics-specs") {
            let xdg_config = dirs.config_dir().join("analytics-specs.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // ANALYTICS_SPECS__PATHS__CSV_DIR and friends
        builder = builder.add_source(
            Environment::with_prefix("ANALYTICS_SPECS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn csv_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.paths.csv_dir)
    }

    pub fn javascript_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.paths.javascript_dir)
    }

    /// The wiki directory to read, falling back when the primary is absent
    pub fn wiki_dir(&self, root: &Path) -> Result<PathBuf> {
        let candidates = [
            resolve(root, &self.paths.wiki_dir),
            resolve(root, &self.paths.wiki_fallback_dir),
        ];
        match candidates.iter().find(|dir| dir.is_dir()) {
            Some(dir) => Ok(dir.clone()),
            None => Err(SpecError::SourceNotFound(candidates.to_vec())),
        }
    }
}
