//! Issue tracker adapters
//!
//! [`GitlabIssueTracker`] turns host configuration and issue requests into
//! GitLab API calls. [`legacy::LegacyIssueTracker`] keeps the older
//! `account`/`project_id` field layout alive for existing installations.

use compact_str::{format_compact, CompactString};
use once_cell::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

pub mod fields;
pub mod legacy;
pub mod params;
pub mod validation;


pub use fields::{FieldDescriptor, FieldSchema, FIELDS};
pub use params::TrackerParams;
pub use validation::ValidationError;

use crate::{
    client::{Connector, HttpConnector, RemoteIssueClient},
    domain::NewIssue,
    id::{IssueId, ProjectId},
    registry::TrackerDescriptor,
    result::{Result, TrackerError},
};

/// Token sent by the endpoint probe; a GitLab API rejects it with 401.
const PROBE_TOKEN: &str = "errbit-probe-invalid-token";

pub const LABEL: &str = "gitlab";

pub const NOTE: &str = "Creates an issue in a Gitlab project for every reported problem. \
    The API Token needs the `api` scope and at least Reporter access to the project.";

pub const DESCRIPTOR: TrackerDescriptor = TrackerDescriptor {
    label: LABEL,
    note: NOTE,
    fields: FIELDS,
    comments_allowed: true,
    deprecated: false,
};

/// An issue filed by [`GitlabIssueTracker::create_issue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    /// Web link to the issue
    pub url: CompactString,
    /// Project-scoped number to pass to [`GitlabIssueTracker::create_comment`]
    pub reference: IssueId,
}

impl std::fmt::Display for CreatedIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Files problems as issues in one GitLab project.
///
/// Each remote interaction connects anew through the [`Connector`]. The only
/// state kept between calls is the project id, looked up by path at most
/// once per instance.
pub struct GitlabIssueTracker<C = HttpConnector> {
    params: TrackerParams,
    connector: C,
    project_id: OnceCell<ProjectId>,
}

impl GitlabIssueTracker<HttpConnector> {
    pub fn new(params: TrackerParams) -> Self {
        Self::with_connector(params, HttpConnector::default())
    }
}

impl<C: Connector> GitlabIssueTracker<C> {
    pub fn with_connector(params: TrackerParams, connector: C) -> Self {
        Self {
            params,
            connector,
            project_id: OnceCell::new(),
        }
    }

    pub fn label() -> &'static str {
        LABEL
    }

    pub fn note() -> &'static str {
        NOTE
    }

    pub fn fields() -> FieldSchema {
        FIELDS
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    /// Whether the host may post follow-up comments with [`Self::create_comment`]
    pub fn comments_allowed(&self) -> bool {
        DESCRIPTOR.comments_allowed
    }

    pub fn is_configured(&self) -> bool {
        self.params.is_configured(FIELDS)
    }

    /// Link to the project's issue list
    pub fn issue_url(&self) -> Result<CompactString> {
        let endpoint = self.require(fields::ENDPOINT)?;
        let path = self.require(fields::PATH_WITH_NAMESPACE)?;

        Ok(format_compact!("{}/{}/issues", params::web_root(endpoint)?, path))
    }

    /// Checks the configuration against the remote server.
    ///
    /// Stops at the first failing step: missing fields, an endpoint that is
    /// not a GitLab API, a rejected token, an invisible project. An empty
    /// list means the configuration is usable.
    #[instrument(skip(self), fields(endpoint = ?self.params.get(fields::ENDPOINT)))]
    pub async fn validate(&self) -> Vec<ValidationError> {
        let (Some(endpoint), Some(token), Some(path)) = (
            self.params.get(fields::ENDPOINT),
            self.params.get(fields::API_TOKEN),
            self.params.get(fields::PATH_WITH_NAMESPACE),
        ) else {
            let missing = self.params.missing(FIELDS);
            debug!(missing = missing.len(), "Configuration incomplete");
            return missing
                .into_iter()
                .map(|(_, field)| ValidationError::MissingField { label: field.label })
                .collect();
        };

        if !self.endpoint_exists(endpoint).await {
            return vec![ValidationError::EndpointUnreachable { endpoint: endpoint.into() }];
        }

        if !self.token_accepted(endpoint, token).await {
            return vec![ValidationError::AuthenticationFailure];
        }

        match self.lookup_project(endpoint, token, path).await {
            Ok(Some(project_id)) => {
                // validation already paid for the lookup
                let _ = self.project_id.set(project_id);
                info!(project = path, project_id = %project_id, "Configuration is valid");
                Vec::new()
            },
            Ok(None) => vec![ValidationError::ProjectNotFound { path: path.into() }],
            Err(e) => {
                warn!(error = %e, project = path, "Project lookup failed");
                vec![ValidationError::ProjectNotFound { path: path.into() }]
            },
        }
    }

    /// Creates an issue and returns its web URL together with the reference
    /// that [`Self::create_comment`] expects.
    ///
    /// Calling this twice creates two issues. Remote failures are returned
    /// as-is; nothing is retried.
    #[instrument(skip(self, body), fields(project = ?self.params.get(fields::PATH_WITH_NAMESPACE)))]
    pub async fn create_issue(&self, title: &str, body: &str) -> Result<CreatedIssue> {
        self.ensure_configured()?;

        let endpoint = self.require(fields::ENDPOINT)?;
        let token = self.require(fields::API_TOKEN)?;
        let path = self.require(fields::PATH_WITH_NAMESPACE)?;
        let web_root = params::web_root(endpoint)?;

        let project_id = self.project_id().await?;

        let mut issue = NewIssue::new(title, body);
        if let Some(labels) = self.params.get(fields::LABELS) {
            issue = issue.with_labels(labels);
        }

        let client = self.connector.connect(endpoint, token)?;
        let created = client.create_issue(project_id, &issue).await?;

        let reference = created.reference();
        let url = format_compact!("{}/{}/issues/{}", web_root, path, reference);
        info!(project_id = %project_id, issue = %reference, url = %url, "Created issue");
        Ok(CreatedIssue { url, reference })
    }

    /// Posts a follow-up comment on an issue created by this tracker, addressed
    /// by [`CreatedIssue::reference`]
    #[instrument(skip(self, body))]
    pub async fn create_comment(&self, issue: IssueId, body: &str) -> Result<()> {
        if !self.comments_allowed() {
            return Err(TrackerError::CommentsNotAllowed);
        }
        self.ensure_configured()?;

        let endpoint = self.require(fields::ENDPOINT)?;
        let token = self.require(fields::API_TOKEN)?;
        let project_id = self.project_id().await?;

        let client = self.connector.connect(endpoint, token)?;
        let note = client.create_issue_note(project_id, issue, body).await?;

        debug!(note_id = note.id, "Created issue note");
        Ok(())
    }

    /// Id of the configured project, looked up on first use
    async fn project_id(&self) -> Result<ProjectId> {
        if let Some(id) = self.project_id.get() {
            return Ok(*id);
        }

        let endpoint = self.require(fields::ENDPOINT)?;
        let token = self.require(fields::API_TOKEN)?;
        let path = self.require(fields::PATH_WITH_NAMESPACE)?;

        let found = self.lookup_project(endpoint, token, path).await.unwrap_or_else(|e| {
            warn!(error = %e, project = path, "Project lookup failed");
            None
        });
        let id = found.ok_or_else(|| TrackerError::ProjectNotFound { path: path.into() })?;

        Ok(*self.project_id.get_or_init(|| id))
    }

    /// Anything but a 401 for a bogus token means there is no GitLab API
    /// at `endpoint`, including timeouts and other transient failures.
    async fn endpoint_exists(&self, endpoint: &str) -> bool {
        let outcome = match self.connector.connect(endpoint, PROBE_TOKEN) {
            Ok(client) => client.current_user().await.map(|_| ()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => true,
            Err(e) if e.is_unauthorized() => true,
            Err(e) => {
                warn!(error = %e, network = e.is_network_error(), "Endpoint probe failed");
                false
            },
        }
    }

    async fn token_accepted(&self, endpoint: &str, token: &str) -> bool {
        let outcome = match self.connector.connect(endpoint, token) {
            Ok(client) => client.current_user().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(user) => {
                debug!(user = %user.username, "Token accepted");
                true
            },
            Err(e) if e.is_unauthorized() => false,
            Err(e) => {
                debug!(error = %e, "Token probe inconclusive");
                true
            },
        }
    }

    /// Linear search over every visible project for an exact path match
    async fn lookup_project(
        &self,
        endpoint: &str,
        token: &str,
        path: &str,
    ) -> crate::client::Result<Option<ProjectId>> {
        let client = self.connector.connect(endpoint, token)?;
        let project = client
            .projects()
            .find(|project| project.path_with_namespace == path)
            .await?;

        Ok(project.map(|p| p.id))
    }

    fn ensure_configured(&self) -> Result<()> {
        let missing = self.params.missing(FIELDS);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TrackerError::NotConfigured(
                missing.into_iter().map(|(_, field)| field.label).collect(),
            ))
        }
    }

    fn require(&self, name: &'static str) -> Result<&str> {
        self.params.get(name).ok_or_else(|| {
            let label = FIELDS
                .iter()
                .find(|(field, _)| *field == name)
                .map_or(name, |(_, descriptor)| descriptor.label);
            TrackerError::NotConfigured(vec![label])
        })
    }
}
