//! Configuration management for GitLab client

use std::{path::PathBuf, time::Duration};

use compact_str::CompactString;
use reqwest::Url;

use super::error::{ClientError, Result};

/// Main configuration for GitLab client
#[derive(Clone)]
pub struct ClientConfig {
    /// GitLab API base URL, e.g. `https://gitlab.example.com/api/v4`
    pub base_url: CompactString,
    /// Private access token
    pub private_token: CompactString,
    /// Request configuration
    pub request: RequestConfig,
    /// Debug configuration
    pub debug: DebugConfig,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Number of items per page for paginated requests
    pub per_page: u32,
    /// Request timeout
    pub timeout: Duration,
    /// Value of the `User-Agent` header
    pub user_agent: CompactString,
    /// Only search projects the user is a member of. Public and internal
    /// projects outside the user's memberships are skipped when set.
    pub membership_only: bool,
}

/// Debug and logging configuration
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Enable debug logging of HTTP responses
    pub log_responses: bool,
    /// Directory for storing debug logs
    pub log_directory: Option<PathBuf>,
}

/// Query parameters for listing projects
#[derive(Debug, Clone)]
pub struct ProjectQuery {
    /// Number of results per page
    pub per_page: u32,
    /// 1-based page number
    pub page: u32,
    /// Include archived projects
    pub archived: bool,
    /// Only include projects where user is a member
    pub membership: bool,
    /// Ask for the reduced project representation
    pub simple: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            per_page: 100,
            timeout: Duration::from_secs(10),
            user_agent: "Errbit User Agent".into(),
            membership_only: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_responses: false,
            log_directory: Some(PathBuf::from("gitlab-issue-logs")),
        }
    }
}

impl Default for ProjectQuery {
    fn default() -> Self {
        Self {
            per_page: 100,
            page: 1,
            archived: false,
            membership: false,
            simple: true,
        }
    }
}

impl ProjectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(
        base_url: impl Into<CompactString>,
        private_token: impl Into<CompactString>,
    ) -> Self {
        let base_url: CompactString = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').into(),
            private_token: private_token.into(),
            request: RequestConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::config("Base URL cannot be empty"));
        }

        if self.private_token.is_empty() {
            return Err(ClientError::config("Private token cannot be empty"));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|_| ClientError::invalid_url(self.base_url.as_str()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::config("Base URL must start with http:// or https://"));
        }

        if self.request.per_page == 0 || self.request.per_page > 100 {
            return Err(ClientError::config("per_page must be between 1 and 100"));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config("Timeout must be greater than zero"));
        }

        Ok(())
    }

    /// Create default project query with config values
    pub fn default_project_query(&self) -> ProjectQuery {
        ProjectQuery {
            membership: self.request.membership_only,
            ..ProjectQuery::new().with_per_page(self.request.per_page)
        }
    }

    /// Set request configuration
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("private_token", &"<redacted>")
            .field("request", &self.request)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = ClientConfig::new("https://gitlab.example.com/api/v4/", "token123");
        assert_eq!(config.base_url, "https://gitlab.example.com/api/v4");
        assert_eq!(config.private_token, "token123");
        assert_eq!(config.request.timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ClientConfig::new("", "token");
        assert!(config.validate().is_err());

        let config = ClientConfig::new("https://gitlab.example.com", "");
        assert!(config.validate().is_err());

        let config = ClientConfig::new("gitlab.example.com", "token");
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl { .. })));

        let config = ClientConfig::new("ftp://gitlab.example.com", "token");
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));

        let mut config = ClientConfig::new("https://gitlab.example.com", "token");
        config.request.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::new("https://gitlab.example.com", "token");
        config.request.per_page = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_output_redacts_token() {
        let config = ClientConfig::new("https://gitlab.example.com", "super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_default_project_query() {
        let mut config = ClientConfig::new("https://gitlab.example.com", "token");
        config.request.per_page = 20;

        let query = config.default_project_query();
        assert_eq!(query.per_page, 20);
        assert_eq!(query.page, 1);
        assert!(!query.membership);
        assert!(!query.archived);

        config.request.membership_only = true;
        assert!(config.default_project_query().membership);
    }
}
