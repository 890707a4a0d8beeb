//! Error types for fetching and converting error events

use crate::path::PathError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while downloading or converting events
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required inputs were not supplied
    #[error("missing required field(s): {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// The csv map file does not exist
    #[error("csv map not found: {}", path.display())]
    MapNotFound { path: PathBuf },

    /// The csv map file exists but is not a JSON array of {header, path}
    #[error("JSON in csv map {} is invalid: {source}", path.display())]
    MapInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The API rejected the auth token
    #[error("request denied because you do not have authorization")]
    Unauthorized,

    /// The project or error does not exist
    #[error("resource not found: {0}")]
    NotFound(String),

    /// API rate limited, retry after the given delay
    #[error("rate limited, retry after {} seconds", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// Any other non-success status
    #[error("unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    /// A page advertised a next page but its last event has no usable received_at
    #[error("cannot continue pagination: last event has no received_at timestamp")]
    MissingCursor,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    InvalidPath(#[from] PathError),
}

impl Error {
    /// Build a validation error from the names of missing fields.
    ///
    /// Returns `None` when nothing is missing so callers can write
    /// `if let Some(err) = Error::missing(fields) { return Err(err) }`.
    pub fn missing<I, S>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            None
        } else {
            Some(Error::Validation { fields })
        }
    }

    /// Names of the missing fields, if this is a validation error
    pub fn missing_fields(&self) -> &[String] {
        match self {
            Error::Validation { fields } => fields,
            _ => &[],
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}
