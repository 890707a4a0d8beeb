//! Blocking HTTP implementation of [`ErrorEventsApi`] for the Bugsnag
//! Data Access API (v2)

use super::{ErrorEventsApi, EventPage, EventPageQuery};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::event::ErrorEvent;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, AUTHORIZATION, LINK, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

// `<https://...>; rel="next"` inside a Link header. `next` must be a whole
// relation type, alone or in a space-separated list.
static NEXT_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<[^>]*>\s*;\s*rel="?(?:[^"]*\s)?next(?:\s[^"]*)?"?\s*(?:[;,]|$)"#).unwrap()
});

/// Bugsnag events API client
pub struct BugsnagClient {
    config: ClientConfig,
    http: Client,
}

impl BugsnagClient {
    /// Create a client from connection settings
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built (e.g. TLS backend failure)
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(BugsnagClient { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn events_url(&self, project_id: &str, error_id: &str) -> String {
        format!(
            "{}/projects/{}/errors/{}/events",
            self.config.api_url.trim_end_matches('/'),
            project_id,
            error_id
        )
    }
}

impl ErrorEventsApi for BugsnagClient {
    fn list_error_events(&self, query: &EventPageQuery<'_>) -> Result<EventPage> {
        let url = self.events_url(query.project_id, query.error_id);

        let mut params = vec![
            ("base", query.base.to_string()),
            ("full_reports", query.full_reports.to_string()),
        ];
        if let Some(per_page) = self.config.per_page {
            params.push(("per_page", per_page.to_string()));
        }

        debug!(url = %url, base = %query.base, "requesting error events");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", self.config.auth_token))
            .header("X-Version", "2")
            .query(&params)
            .send()?;

        let status = response.status();
        let headers = response.headers().clone();

        if status.is_success() {
            let has_next = has_next_page(&headers);
            let events: Vec<ErrorEvent> = response.json()?;
            debug!(count = events.len(), has_next, "received page");
            return Ok(EventPage { events, has_next });
        }

        let body = response.text().unwrap_or_default();
        Err(status_error(status, &headers, body, &url))
    }
}

/// Whether a `Link` header announces a next page
pub fn has_next_page(headers: &HeaderMap) -> bool {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|link| NEXT_LINK_REGEX.is_match(link))
}

/// Seconds from a `Retry-After` header. Absent or non-numeric values count as zero.
pub fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0);
    Duration::from_secs(secs)
}

/// Map a non-success response to an error
fn status_error(status: StatusCode, headers: &HeaderMap, body: String, url: &str) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            retry_after: retry_after(headers),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized,
        StatusCode::NOT_FOUND => Error::NotFound(url.to_string()),
        _ => Error::Status {
            status: status.as_u16(),
            body,
        },
    }
}
