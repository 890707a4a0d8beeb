//! The two end-to-end operations: download events as CSV, and generate a
//! CSV map from a sample page.

use crate::client::{ErrorEventClient, ErrorEventsApi};
use crate::config::FetchRequest;
use crate::convert::CsvConverter;
use crate::csv_map::{CsvMap, CsvMapBuilder, MapOptions};
use crate::error::Result;
use tracing::info;

/// Download every event of an error and render it through a CSV map
pub struct ErrorEvents<A> {
    client: ErrorEventClient<A>,
    converter: CsvConverter,
}

impl<A: ErrorEventsApi> ErrorEvents<A> {
    /// Validate the request and load the CSV map.
    ///
    /// All missing inputs (`project_id`, `error_id`, `csv_map_path`) are
    /// reported together before the map file is touched.
    pub fn new(api: A, request: &FetchRequest) -> Result<Self> {
        request.validate_for_export()?;

        let client = ErrorEventClient::new(
            api,
            request.project_id.clone(),
            request.error_id.clone(),
        )?;
        let converter = CsvConverter::new(request.csv_map_path.as_deref())?;

        Ok(ErrorEvents { client, converter })
    }

    /// Fetch all events and return the CSV document
    pub fn run(&mut self) -> Result<String> {
        let events = self.client.fetch_all()?;
        info!(events = events.len(), "download complete");
        self.converter.convert(events.as_slice())
    }
}

/// Generate a CSV map from the newest page of events
pub struct GenerateCsvMap<A> {
    client: ErrorEventClient<A>,
    builder: CsvMapBuilder,
}

impl<A: ErrorEventsApi> GenerateCsvMap<A> {
    pub fn new(api: A, request: &FetchRequest) -> Result<Self> {
        let client = ErrorEventClient::new(
            api,
            request.project_id.clone(),
            request.error_id.clone(),
        )?;
        let builder = CsvMapBuilder::new(MapOptions {
            include_stacktrace: request.include_stacktrace,
            include_breadcrumbs: request.include_breadcrumbs,
        });

        Ok(GenerateCsvMap { client, builder })
    }

    /// Fetch the first page and return the map as JSON text
    pub fn run(&mut self) -> Result<String> {
        self.build()?.to_json()
    }

    /// Fetch the first page and return the map
    pub fn build(&mut self) -> Result<CsvMap> {
        let samples = self.client.fetch_first()?;
        let map = self.builder.build(&samples);
        info!(samples = samples.len(), columns = map.len(), "generated csv map");
        Ok(map)
    }
}
