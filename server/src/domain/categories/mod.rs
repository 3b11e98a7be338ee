//! Bus category mapping
//!
//! Collapses the raw `Bus_Type` strings found in the schedule tables into a
//! small set of named categories. The mapping is plain data: a bundled JSON
//! list of `{label, bus_types}` entries, optionally replaced by a file named
//! in the configuration.
//!
//! Categories may share raw values; expansion unions them into a set.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category map shipped with the binary
const BUNDLED_CATEGORIES: &str = include_str!("bus_categories.json");

#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("Failed to read category map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid category map: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Category label must not be empty")]
    EmptyLabel,

    #[error("Duplicate category label: {0}")]
    DuplicateLabel(String),

    #[error("Category '{0}' has no bus types")]
    EmptyCategory(String),

    #[error("Unknown bus category: {0}")]
    UnknownLabel(String),
}

/// One category and the raw bus types it expands to
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryEntry {
    pub label: String,
    pub bus_types: Vec<String>,
}

/// Ordered category label -> raw bus types mapping
#[derive(Debug, Clone)]
pub struct CategoryMap {
    entries: Vec<CategoryEntry>,
}

impl CategoryMap {
    /// The category map bundled with the binary
    pub fn bundled() -> Result<Self, CategoryError> {
        Self::from_json(BUNDLED_CATEGORIES)
    }

    /// Load a category map from a JSON file
    pub fn load(path: &Path) -> Result<Self, CategoryError> {
        tracing::debug!(path = %path.display(), "Loading category map");
        let content = fs::read_to_string(path).map_err(|source| CategoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a category map
    pub fn from_json(json: &str) -> Result<Self, CategoryError> {
        let entries: Vec<CategoryEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Build from entries; labels must be non-empty and unique, lists non-empty
    pub fn new(entries: Vec<CategoryEntry>) -> Result<Self, CategoryError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.label.trim().is_empty() {
                return Err(CategoryError::EmptyLabel);
            }
            if !seen.insert(entry.label.as_str()) {
                return Err(CategoryError::DuplicateLabel(entry.label.clone()));
            }
            if entry.bus_types.is_empty() {
                return Err(CategoryError::EmptyCategory(entry.label.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// Category labels in declaration order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Raw bus types of one category
    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.bus_types.as_slice())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    /// Check user-supplied labels before expansion
    pub fn validate_labels<I, S>(&self, labels: I) -> Result<(), CategoryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for label in labels {
            let label = label.as_ref();
            if !self.contains(label) {
                return Err(CategoryError::UnknownLabel(label.to_string()));
            }
        }
        Ok(())
    }

    /// Union of the raw bus types of every selected category
    ///
    /// Labels must come from this map. An unknown label is a programming
    /// error: debug builds panic, release builds log it and skip the label.
    pub fn expand<I, S>(&self, selected: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bus_types = BTreeSet::new();
        for label in selected {
            let label = label.as_ref();
            match self.get(label) {
                Some(raw) => bus_types.extend(raw.iter().cloned()),
                None => {
                    tracing::error!(label, "Unknown bus category label ignored");
                    if cfg!(debug_assertions) {
                        panic!("unknown bus category label: {}", label);
                    }
                }
            }
        }
        bus_types
    }
}
