//! Error event download
//!
//! [`ErrorEventsApi`] is the seam to the remote service: one call returns
//! one page of events plus whether another page follows. [`ErrorEventClient`]
//! drives it page by page, and [`http::BugsnagClient`] is the real HTTP
//! implementation.

pub mod http;
pub mod pagination;

pub use self::http::BugsnagClient;
pub use self::pagination::ErrorEventClient;

use crate::error::Result;
use crate::event::ErrorEvent;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::info;

/// Format of the `base` query parameter
pub const BASE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Render a timestamp as a `base` cursor, truncated to seconds
pub fn format_base(ts: DateTime<Utc>) -> String {
    ts.format(BASE_FORMAT).to_string()
}

/// Parameters of one page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPageQuery<'a> {
    pub project_id: &'a str,
    pub error_id: &'a str,
    /// Only events received at or before this time are returned
    pub base: &'a str,
    /// Ask for complete event payloads
    pub full_reports: bool,
}

/// One page of events
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub events: Vec<ErrorEvent>,
    /// Whether the response carried a `next` relation
    pub has_next: bool,
}

/// Source of error event pages.
///
/// Implementations report throttling as
/// [`Error::RateLimited`](crate::Error::RateLimited); every other error is
/// treated as fatal by the pagination loop.
pub trait ErrorEventsApi {
    fn list_error_events(&self, query: &EventPageQuery<'_>) -> Result<EventPage>;
}

impl<T: ErrorEventsApi + ?Sized> ErrorEventsApi for &T {
    fn list_error_events(&self, query: &EventPageQuery<'_>) -> Result<EventPage> {
        (**self).list_error_events(query)
    }
}

/// Blocks the current thread during rate-limit back-off
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps with [`std::thread::sleep`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Receives the running count of downloaded events.
///
/// Called once per continuation page. It must not fail or block.
pub trait Progress {
    fn downloaded(&mut self, count: usize);
}

impl<F: FnMut(usize)> Progress for F {
    fn downloaded(&mut self, count: usize) {
        self(count)
    }
}

/// Logs progress at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn downloaded(&mut self, count: usize) {
        info!(downloaded = count, "downloading events, in progress");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_base_truncates_to_seconds() {
        let ts = Utc.with_ymd_and_hms(2022, 1, 1, 8, 5, 9).unwrap()
            + chrono::Duration::milliseconds(750);
        assert_eq!(format_base(ts), "2022-01-01T08:05:09Z");
    }

    #[test]
    fn test_closure_progress() {
        let mut seen = Vec::new();
        {
            let mut progress = |n: usize| seen.push(n);
            progress.downloaded(3);
            progress.downloaded(5);
        }
        assert_eq!(seen, [3, 5]);
    }
}
