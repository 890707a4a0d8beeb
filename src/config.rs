use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "https://api.bugsnag.com";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the events API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Personal auth token
    pub auth_token: String,

    /// API base URL, without a trailing slash
    pub api_url: String,

    /// Timeout applied to each request
    pub timeout: Duration,

    /// Events per page; the server default is used when unset
    pub per_page: Option<u32>,

    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(auth_token: impl Into<String>) -> Self {
        ClientConfig {
            auth_token: auth_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            per_page: None,
            user_agent: format!("bugsnag-export/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// What to download and how to shape it
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    pub project_id: Option<String>,
    pub error_id: Option<String>,

    /// Map used to turn events into CSV
    pub csv_map_path: Option<PathBuf>,

    /// Keep `stacktrace` paths when generating a map
    pub include_stacktrace: bool,

    /// Keep `breadcrumbs` paths when generating a map
    pub include_breadcrumbs: bool,
}

impl FetchRequest {
    /// Names of required id fields that are absent or empty
    pub fn missing_ids(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(self.project_id.as_deref()) {
            missing.push("project_id");
        }
        if is_blank(self.error_id.as_deref()) {
            missing.push("error_id");
        }
        missing
    }

    /// Check everything needed to download events and convert them
    pub fn validate_for_export(&self) -> Result<()> {
        let mut missing = self.missing_ids();
        if self.csv_map_path.as_ref().map_or(true, |p| p.as_os_str().is_empty()) {
            missing.push("csv_map_path");
        }
        match Error::missing(missing) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new("token");
        assert_eq!(config.api_url, "https://api.bugsnag.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.per_page.is_none());
        assert!(config.user_agent.starts_with("bugsnag-export/"));
    }

    #[test]
    fn test_missing_ids() {
        let request = FetchRequest::default();
        assert_eq!(request.missing_ids(), ["project_id", "error_id"]);

        let request = FetchRequest {
            project_id: Some("p".into()),
            error_id: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(request.missing_ids(), ["error_id"]);
    }

    #[test]
    fn test_validate_for_export_names_everything() {
        let err = FetchRequest::default().validate_for_export().unwrap_err();
        assert_eq!(err.missing_fields(), ["project_id", "error_id", "csv_map_path"]);

        let ok = FetchRequest {
            project_id: Some("p".into()),
            error_id: Some("e".into()),
            csv_map_path: Some(PathBuf::from("map.json")),
            ..Default::default()
        };
        assert!(ok.validate_for_export().is_ok());
    }
}
