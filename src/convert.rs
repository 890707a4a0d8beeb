//! Render events as CSV using a [`CsvMap`]

use crate::csv_map::CsvMap;
use crate::error::{Error, Result};
use crate::event::ErrorEvent;
use crate::path::{extract, JsonPath};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Converts events into CSV text, one row per event
#[derive(Debug, Clone)]
pub struct CsvConverter {
    csv_map: CsvMap,
    /// Parsed path per map entry; `None` if the entry's path is malformed
    paths: Vec<Option<JsonPath>>,
}

impl CsvConverter {
    /// Load the map at `csv_map_path`.
    ///
    /// # Errors
    ///
    /// `Validation` naming `csv_map_path` if no path was given, otherwise
    /// whatever [`CsvMap::from_path`] reports.
    pub fn new(csv_map_path: Option<&Path>) -> Result<Self> {
        let path = match csv_map_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => {
                return Err(Error::Validation {
                    fields: vec!["csv_map_path".to_string()],
                })
            }
        };
        Ok(Self::from_map(CsvMap::from_path(path)?))
    }

    /// Use an already loaded map
    pub fn from_map(csv_map: CsvMap) -> Self {
        let paths = csv_map
            .entries()
            .iter()
            .map(|entry| match JsonPath::parse(&entry.path) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(header = %entry.header, error = %e, "csv map path is invalid, column will be empty");
                    None
                }
            })
            .collect();

        CsvConverter { csv_map, paths }
    }

    pub fn csv_map(&self) -> &CsvMap {
        &self.csv_map
    }

    /// Produce the CSV document: a header row, then one row per event.
    ///
    /// Fields are quoted only when they contain a delimiter, a quote or a
    /// line break. A record with no fields, or a single empty one, is
    /// written as a bare `\n`.
    pub fn convert(&self, events: &[ErrorEvent]) -> Result<String> {
        let mut writer = new_writer(Vec::new());

        let headers: Vec<String> = self.csv_map.headers().map(str::to_string).collect();
        write_row(&mut writer, &headers)?;

        for event in events {
            let row = self
                .paths
                .iter()
                .map(|path| match path {
                    Some(path) => render_cell(extract(event.as_value(), path)),
                    None => String::new(),
                })
                .collect::<Vec<_>>();
            write_row(&mut writer, &row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

/// Write one record. The csv crate quotes a lone empty field as `""` so the
/// line is not blank; such records are written as an empty line instead.
fn write_row(writer: &mut csv::Writer<Vec<u8>>, row: &[String]) -> Result<()> {
    match row {
        [] => {}
        [only] if only.is_empty() => {}
        _ => return Ok(writer.write_record(row)?),
    }
    let inner = std::mem::replace(writer, new_writer(Vec::new()));
    let mut bytes = inner.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    bytes.write_all(b"\n")?;
    *writer = new_writer(bytes);
    Ok(())
}

fn new_writer(buf: Vec<u8>) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf)
}

/// Join matched values with `,`, dropping repeated values
fn render_cell(values: Vec<&Value>) -> String {
    let mut unique: Vec<&Value> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }

    unique
        .into_iter()
        .map(value_to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // Objects and arrays are written as compact JSON
        other => other.to_string(),
    }
}
