//! The first field layout, addressing the project by numeric id over the
//! v3 API. Kept for installations configured before `path_with_namespace`
//! existed; new setups should use [`super::GitlabIssueTracker`].

use compact_str::{format_compact, CompactString};
use tracing::{info, instrument};

use super::{
    fields::{FieldDescriptor, FieldSchema, API_TOKEN},
    params::TrackerParams,
    validation::ValidationError,
};
use crate::{
    client::{Connector, HttpConnector, RemoteIssueClient},
    domain::NewIssue,
    id::ProjectId,
    registry::TrackerDescriptor,
    result::{Result, TrackerError},
};

pub const ACCOUNT: &str = "account";
pub const PROJECT_ID: &str = "project_id";
pub const ALT_PROJECT_ID: &str = "alt_project_id";

pub const LABEL: &str = "gitlab-legacy";

const ISSUE_LABELS: &str = "errbit";

pub const FIELDS: FieldSchema = &[
    (ACCOUNT, FieldDescriptor {
        label: "Gitlab URL",
        placeholder: "e.g. https://example.net",
        required: true,
    }),
    (API_TOKEN, FieldDescriptor {
        label: "API Token",
        placeholder: "API Token for your account",
        required: true,
    }),
    (PROJECT_ID, FieldDescriptor {
        label: "Ticket Project ID (use Number)",
        placeholder: "Gitlab Project where issues will be created",
        required: true,
    }),
    (ALT_PROJECT_ID, FieldDescriptor {
        label: "Project Name (namespace/project)",
        placeholder: "Gitlab Project where issues will be created",
        required: true,
    }),
];

pub const DESCRIPTOR: TrackerDescriptor = TrackerDescriptor {
    label: LABEL,
    note: "",
    fields: FIELDS,
    comments_allowed: false,
    deprecated: true,
};

pub struct LegacyIssueTracker<C = HttpConnector> {
    params: TrackerParams,
    connector: C,
}

impl LegacyIssueTracker<HttpConnector> {
    pub fn new(params: TrackerParams) -> Self {
        Self::with_connector(params, HttpConnector::default())
    }
}

impl<C: Connector> LegacyIssueTracker<C> {
    pub fn with_connector(params: TrackerParams, connector: C) -> Self {
        Self { params, connector }
    }

    pub fn fields() -> FieldSchema {
        FIELDS
    }

    pub fn comments_allowed(&self) -> bool {
        DESCRIPTOR.comments_allowed
    }

    /// Only the project id and token are needed to file an issue
    pub fn is_configured(&self) -> bool {
        !self.params.is_blank(PROJECT_ID) && !self.params.is_blank(API_TOKEN)
    }

    /// Reports a single message when any field is blank; makes no remote calls.
    pub fn validate(&self) -> Vec<ValidationError> {
        if self.params.is_configured(FIELDS) {
            Vec::new()
        } else {
            vec![ValidationError::LegacyIncomplete]
        }
    }

    pub fn url(&self) -> CompactString {
        format_compact!(
            "{}/{}/issues",
            self.account(),
            self.params.get(ALT_PROJECT_ID).unwrap_or_default()
        )
    }

    /// Creates the issue with `summary` as its description, then attaches
    /// `body` as a note. Returns the link to the new issue.
    #[instrument(skip(self, summary, body))]
    pub async fn create_issue(&self, title: &str, summary: &str, body: &str) -> Result<CompactString> {
        let raw_id = self.params.get(PROJECT_ID).unwrap_or_default();
        let project_id: ProjectId = raw_id
            .parse()
            .map_err(|_| TrackerError::InvalidProjectId(raw_id.into()))?;
        let token = self
            .params
            .get(API_TOKEN)
            .ok_or_else(|| TrackerError::NotConfigured(vec!["API Token"]))?;

        let endpoint = format_compact!("{}/api/v3", self.account());
        let client = self.connector.connect(&endpoint, token)?;

        let issue = NewIssue::new(title, summary).with_labels(ISSUE_LABELS);
        let ticket = client.create_issue(project_id, &issue).await?;
        // v3 addresses issues by their global id
        client.create_issue_note(project_id, ticket.id, body).await?;

        let link = format_compact!("{}/{}", self.url(), ticket.id);
        info!(project_id = %project_id, issue = %ticket.id, url = %link, "Created issue");
        Ok(link)
    }

    fn account(&self) -> &str {
        self.params
            .get(ACCOUNT)
            .map(|a| a.trim_end_matches('/'))
            .unwrap_or_default()
    }
}
