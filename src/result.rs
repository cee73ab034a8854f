use compact_str::CompactString;
use itertools::Itertools;
use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Project '{path}' could not be found with the given API Token")]
    ProjectNotFound { path: CompactString },
    #[error("Invalid Gitlab URL: {0}")]
    InvalidEndpoint(CompactString),
    #[error("Project ID must be a number, got '{0}'")]
    InvalidProjectId(CompactString),
    #[error("Comments are not supported by this issue tracker.")]
    CommentsNotAllowed,
    #[error("The issue tracker is missing required configuration: {}", .0.iter().join(", "))]
    NotConfigured(Vec<&'static str>),
    #[error("Failure reading configuration file: {0}")]
    ConfigError(CompactString),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err: TrackerError = ClientError::Authentication.into();
        assert_eq!(err.to_string(), "Authentication failed");
    }

    #[test]
    fn not_configured_lists_the_missing_labels() {
        let err = TrackerError::NotConfigured(vec!["Gitlab URL", "API Token"]);
        assert_eq!(
            err.to_string(),
            "The issue tracker is missing required configuration: Gitlab URL, API Token"
        );
    }
}
