//! # bugsnag-export - error events to CSV
//!
//! Downloads every event of one Bugsnag error and flattens the nested event
//! JSON into CSV columns chosen by a path map.
//!
//! ## Modules
//!
//! - **path**: enumerate every path in a JSON document and extract values by path
//! - **csv_map**: generate, load and save header/path column maps
//! - **client**: cursor pagination with rate-limit back-off, plus the HTTP client
//! - **convert**: render events as CSV through a map
//! - **commands**: the two end-to-end operations used by the CLI
//!
//! ## Quick Start
//!
//! ### Generating a map
//!
//! ```rust
//! use bugsnag_export::{CsvMapBuilder, ErrorEvent, MapOptions};
//! use serde_json::json;
//!
//! let sample = ErrorEvent::new(json!({
//!     "id": "33333",
//!     "url": "https://api.bugsnag.com/projects/11111/events/33333",
//!     "exception": [{"error_class": "NotFoundError", "message": "Response code = 404"}]
//! }));
//!
//! let map = CsvMapBuilder::new(MapOptions::default()).build(&[sample]);
//! // $.url, $.exception, $.exception[0].error_class, $.exception[0].message, $.exception[0]
//! assert_eq!(map.len(), 5);
//! ```
//!
//! ### Converting events
//!
//! ```rust
//! use bugsnag_export::{CsvConverter, CsvMap, ErrorEvent, PathEntry};
//! use serde_json::json;
//!
//! # fn main() -> bugsnag_export::Result<()> {
//! let map = CsvMap::new(vec![
//!     PathEntry::new("id", "$.id"),
//!     PathEntry::new("class", "$.exception[0].error_class"),
//! ]);
//! let events = vec![ErrorEvent::new(json!({
//!     "id": "33333",
//!     "exception": [{"error_class": "NotFoundError"}]
//! }))];
//!
//! let csv = CsvConverter::from_map(map).convert(&events)?;
//! assert_eq!(csv, "id,class\n33333,NotFoundError\n");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod commands;
pub mod config;
pub mod convert;
pub mod csv_map;
pub mod error;
pub mod event;
pub mod path;

// Re-export commonly used types for convenience
pub use client::{BugsnagClient, ErrorEventClient, ErrorEventsApi, EventPage, EventPageQuery};
pub use commands::{ErrorEvents, GenerateCsvMap};
pub use config::{ClientConfig, FetchRequest};
pub use convert::CsvConverter;
pub use csv_map::{CsvMap, CsvMapBuilder, MapOptions, PathEntry};
pub use error::{Error, Result};
pub use event::{ErrorEvent, EventSet};
pub use path::{enumerate_paths, extract, JsonPath};
