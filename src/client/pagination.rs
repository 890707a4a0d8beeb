//! Cursor-based pagination over all events of one error
//!
//! The first request uses the current time as `base`. Each following
//! request uses the `received_at` of the last event of the previous page,
//! until a page arrives without a `next` relation. Pages may overlap, so
//! events are merged by id.
//!
//! There is no cap on the number of pages and no limit on rate-limit
//! retries: a server that always advertises another page, or always
//! throttles, keeps the loop running. Callers that need a deadline must
//! impose it from outside.

use super::{
    format_base, ErrorEventsApi, EventPage, EventPageQuery, LogProgress, Progress, Sleeper,
    ThreadSleeper,
};
use crate::config::is_blank;
use crate::error::{Error, Result};
use crate::event::{ErrorEvent, EventSet};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Downloads the events of one error, page by page
pub struct ErrorEventClient<A, S = ThreadSleeper> {
    api: A,
    sleeper: S,
    progress: Box<dyn Progress>,
    project_id: String,
    error_id: String,
    /// Whether the last page fetched announced another one
    has_next: bool,
    /// `received_at` of the last event on the last page fetched
    cursor: Option<DateTime<Utc>>,
}

impl<A: ErrorEventsApi> ErrorEventClient<A> {
    /// Create a client for one project/error pair.
    ///
    /// # Errors
    ///
    /// `Validation` naming every id that is missing or empty.
    pub fn new(api: A, project_id: Option<String>, error_id: Option<String>) -> Result<Self> {
        let mut missing = Vec::new();
        if is_blank(project_id.as_deref()) {
            missing.push("project_id");
        }
        if is_blank(error_id.as_deref()) {
            missing.push("error_id");
        }
        if let Some(err) = Error::missing(missing) {
            return Err(err);
        }

        Ok(ErrorEventClient {
            api,
            sleeper: ThreadSleeper,
            progress: Box::new(LogProgress),
            project_id: project_id.unwrap_or_default(),
            error_id: error_id.unwrap_or_default(),
            has_next: false,
            cursor: None,
        })
    }
}

impl<A: ErrorEventsApi, S: Sleeper> ErrorEventClient<A, S> {
    /// Replace the back-off sleeper
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> ErrorEventClient<A, T> {
        ErrorEventClient {
            api: self.api,
            sleeper,
            progress: self.progress,
            project_id: self.project_id,
            error_id: self.error_id,
            has_next: self.has_next,
            cursor: self.cursor,
        }
    }

    /// Replace the progress observer
    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn error_id(&self) -> &str {
        &self.error_id
    }

    /// Fetch the newest page of events, using the current time as `base`
    pub fn fetch_first(&mut self) -> Result<Vec<ErrorEvent>> {
        self.fetch_first_from(Utc::now())
    }

    /// Fetch the first page of events received at or before `base`
    pub fn fetch_first_from(&mut self, base: DateTime<Utc>) -> Result<Vec<ErrorEvent>> {
        let base = format_base(base);
        debug!(
            project_id = %self.project_id,
            error_id = %self.error_id,
            base = %base,
            "fetching first page of events"
        );
        let page = self.fetch_page(&base)?;
        self.record(&page);
        Ok(page.events)
    }

    /// Follow `next` relations until the last page.
    ///
    /// Returns only the events of the continuation pages, merged by id.
    /// Does nothing unless a previous fetch announced another page.
    pub fn fetch_subsequent(&mut self) -> Result<EventSet> {
        let mut events = EventSet::new();

        while self.has_next {
            let cursor = self.cursor.ok_or(Error::MissingCursor)?;
            let base = format_base(cursor);
            debug!(base = %base, "fetching next page of events");

            let page = self.fetch_page(&base)?;
            self.record(&page);
            events.extend(page.events);
            self.progress.downloaded(events.len());
        }

        Ok(events)
    }

    /// Download every event of the error, newest page first
    pub fn fetch_all(&mut self) -> Result<EventSet> {
        self.fetch_all_from(Utc::now())
    }

    /// Download every event received at or before `base`
    pub fn fetch_all_from(&mut self, base: DateTime<Utc>) -> Result<EventSet> {
        let mut events: EventSet = self.fetch_first_from(base)?.into_iter().collect();
        events.extend(self.fetch_subsequent()?);
        Ok(events)
    }

    /// Issue one page request, waiting out rate limits.
    ///
    /// A throttled request is re-sent unchanged after the server's delay,
    /// as many times as needed.
    fn fetch_page(&self, base: &str) -> Result<EventPage> {
        let query = EventPageQuery {
            project_id: &self.project_id,
            error_id: &self.error_id,
            base,
            full_reports: true,
        };

        loop {
            match self.api.list_error_events(&query) {
                Err(Error::RateLimited { retry_after }) => {
                    warn!(
                        retry_after_secs = retry_after.as_secs(),
                        base = %base,
                        "rate limit exceeded, waiting before retrying"
                    );
                    self.sleeper.sleep(retry_after);
                }
                result => return result,
            }
        }
    }

    fn record(&mut self, page: &EventPage) {
        self.has_next = page.has_next;
        self.cursor = page.events.last().and_then(ErrorEvent::received_at);
    }
}
