use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use compact_str::ToCompactString;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::{
    client::RequestConfig,
    result::{Result, TrackerError},
    tracker::{
        fields::{API_TOKEN, ENDPOINT, LABELS, PATH_WITH_NAMESPACE},
        TrackerParams,
    },
};

/// Tracker settings as stored by the command line host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base URL of the GitLab API, e.g. `https://gitlab.example.com/api/v4`
    pub endpoint: String,
    /// Personal Access Token with the `api` scope
    pub api_token: String,
    /// Project issues are filed in, as `namespace/project`
    pub path_with_namespace: String,
    /// Comma separated labels applied to new issues
    #[serde(default)]
    pub labels: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Restrict the project search to projects the user is a member of
    #[serde(default)]
    pub membership_only: bool,
}

fn default_timeout_secs() -> u64 {
    RequestConfig::default().timeout.as_secs()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_token: String::new(),
            path_with_namespace: String::new(),
            labels: None,
            timeout_secs: default_timeout_secs(),
            membership_only: false,
        }
    }
}

impl HarnessConfig {
    pub fn tracker_params(&self) -> TrackerParams {
        let params = TrackerParams::new()
            .with(ENDPOINT, self.endpoint.as_str())
            .with(API_TOKEN, self.api_token.as_str())
            .with(PATH_WITH_NAMESPACE, self.path_with_namespace.as_str());

        match &self.labels {
            Some(labels) => params.with(LABELS, labels.as_str()),
            None => params,
        }
    }

    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            membership_only: self.membership_only,
            ..RequestConfig::default()
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = BaseDirs::new() {
        dirs.config_dir().join("gitlab-issue.toml")
    } else {
        PathBuf::from("gitlab-issue.toml")
    }
}

pub fn load_config(config_file: &Path) -> Result<HarnessConfig> {
    confy::load_path(config_file).map_err(|e| TrackerError::ConfigError(e.to_compact_string()))
}

pub fn save_config(config_file: &Path, config: &HarnessConfig) -> Result<()> {
    confy::store_path(config_file, config)
        .map_err(|e| TrackerError::ConfigError(e.to_compact_string()))?;

    Ok(())
}
