//! Serializable index configuration.
//!
//! One `IndexConfig` describes one composite index: where its sheet lives,
//! how the sheet is laid out, and what value the index is rebased to.
//! A `RunConfig` TOML file bundles several of them:
//!
//! ```toml
//! output_dir = "results"
//!
//! [[index]]
//! name = "Neo Bank"
//! input = "data/neo_banks"
//! sheet = 0
//!
//! [[index]]
//! name = "Challenger Bank"
//! input = "data/challenger_banks.csv"
//! shape = "single-index"
//! date_column = 0
//! date_order = "day-first"
//! base_value = 1000.0
//! ```

use indexlab_core::data::DateOrder;
use indexlab_core::TableShape;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("base_value must be finite and positive, got {0}")]
    InvalidBaseValue(f64),

    #[error("index name must not be empty")]
    EmptyName,

    #[error("duplicate index name '{0}'")]
    DuplicateName(String),

    #[error("config lists no [[index]] entries")]
    NoIndices,
}

/// Column layout selector as written in config files and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    /// Repeating (date, price) column pairs.
    #[default]
    Paired,
    /// One date column plus one price column per entity.
    SingleIndex,
}

/// Which sheet of a workbook to read: by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

fn default_name() -> String {
    "Index".to_string()
}

fn default_base_value() -> f64 {
    100.0
}

fn default_preview_rows() -> usize {
    5
}

/// Configuration for a single composite index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Display name, e.g. "Neo Bank".
    #[serde(default = "default_name")]
    pub name: String,

    /// Workbook path: a CSV file or a directory of CSV sheets.
    pub input: PathBuf,

    /// Rebasing anchor: the index value on the base date.
    #[serde(default = "default_base_value")]
    pub base_value: f64,

    #[serde(default)]
    pub shape: ShapeKind,

    /// Date column position for the single-index layout (0-based).
    #[serde(default)]
    pub date_column: usize,

    /// How ambiguous numeric dates such as `03/04/2024` are read.
    #[serde(default)]
    pub date_order: DateOrder,

    #[serde(default)]
    pub sheet: SheetSelector,

    /// Rows shown in head/tail previews.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl IndexConfig {
    pub fn new(name: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            base_value: default_base_value(),
            shape: ShapeKind::default(),
            date_column: 0,
            date_order: DateOrder::default(),
            sheet: SheetSelector::default(),
            preview_rows: default_preview_rows(),
        }
    }

    /// The normalizer layout this config selects.
    pub fn table_shape(&self) -> TableShape {
        match self.shape {
            ShapeKind::Paired => TableShape::Paired,
            ShapeKind::SingleIndex => TableShape::SingleIndex {
                date_column: self.date_column,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if !self.base_value.is_finite() || self.base_value <= 0.0 {
            return Err(ConfigError::InvalidBaseValue(self.base_value));
        }
        Ok(())
    }

    /// Filesystem-safe form of the name: "Neo Bank" → "neo_bank".
    pub fn slug(&self) -> String {
        let slug: String = self
            .name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        if slug.is_empty() {
            "index".to_string()
        } else {
            slug
        }
    }
}

/// A batch of indices plus shared output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Where artifacts go. `None` skips export.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(rename = "index", default)]
    pub indices: Vec<IndexConfig>,
}

impl RunConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file. Relative paths resolve against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indices.is_empty() {
            return Err(ConfigError::NoIndices);
        }
        let mut names = HashSet::new();
        for index in &self.indices {
            index.validate()?;
            if !names.insert(index.name.trim()) {
                return Err(ConfigError::DuplicateName(index.name.clone()));
            }
        }
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for index in &mut self.indices {
            if index.input.is_relative() {
                index.input = base.join(&index.input);
            }
        }
        if let Some(dir) = &self.output_dir {
            if dir.is_relative() {
                self.output_dir = Some(base.join(dir));
            }
        }
    }
}
