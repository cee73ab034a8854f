//! GitLab client modules
//!
//! The issue tracker talks to GitLab only through [`RemoteIssueClient`];
//! [`GitlabApi`] is the reqwest-backed implementation and [`Connector`]
//! opens a fresh client for every remote interaction.

use std::future::Future;

pub mod api;
pub mod config;
pub mod error;
pub mod pagination;

#[cfg(test)]
mod tests;

pub use api::GitlabApi;
pub use config::{ClientConfig, DebugConfig, RequestConfig};
pub use error::{ClientError, Result};
pub use pagination::{Page, ProjectCursor};

use crate::{
    domain::{IssueDto, NewIssue, NoteDto, ProjectDto, UserDto},
    id::{IssueId, ProjectId},
};

/// The remote operations the issue tracker depends on
pub trait RemoteIssueClient {
    /// Look up the user owning the token; used as an authentication probe
    fn current_user(&self) -> impl Future<Output = Result<UserDto>> + Send;

    /// One page (1-based) of the projects visible to the authenticated user
    fn projects_page(&self, page: u32) -> impl Future<Output = Result<Page<ProjectDto>>> + Send;

    fn create_issue(
        &self,
        project_id: ProjectId,
        issue: &NewIssue,
    ) -> impl Future<Output = Result<IssueDto>> + Send;

    /// Adds a note to the issue with the given project-scoped number
    fn create_issue_note(
        &self,
        project_id: ProjectId,
        issue: IssueId,
        body: &str,
    ) -> impl Future<Output = Result<NoteDto>> + Send;

    /// Lazily lists visible projects, starting from the first page
    fn projects(&self) -> ProjectCursor<'_, Self>
    where
        Self: Sized,
    {
        ProjectCursor::new(self)
    }
}

/// Opens clients for an endpoint/token pair
pub trait Connector {
    type Client: RemoteIssueClient;

    fn connect(&self, endpoint: &str, private_token: &str) -> Result<Self::Client>;
}

/// Connects [`GitlabApi`] clients sharing one request/debug configuration
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    request: RequestConfig,
    debug: DebugConfig,
}

impl HttpConnector {
    pub fn new(request: RequestConfig) -> Self {
        Self { request, debug: DebugConfig::default() }
    }

    /// Write every response body to the debug log directory
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug.log_responses = enabled;
        self
    }
}

impl Connector for HttpConnector {
    type Client = GitlabApi;

    fn connect(&self, endpoint: &str, private_token: &str) -> Result<GitlabApi> {
        let mut config = ClientConfig::new(endpoint, private_token).with_request(self.request.clone());
        config.debug = self.debug.clone();

        GitlabApi::new(config)
    }
}
