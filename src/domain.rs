// GitLab API Documentation: https://docs.gitlab.com/ee/api/api_resources.html
use chrono::{DateTime, Utc};
use compact_str::{format_compact, CompactString};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::id::{IssueId, ProjectId, UserId};

/// Issue titles are cut to this many characters of the problem message.
const TITLE_MESSAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDto {
    pub id: UserId,
    pub username: CompactString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDto {
    pub id: ProjectId,
    pub path_with_namespace: CompactString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueDto {
    pub id: IssueId,
    pub iid: Option<IssueId>,
    #[serde(default)]
    pub title: CompactString,
    pub web_url: Option<CompactString>,
    pub created_at: Option<DateTime<Utc>>,
}

impl IssueDto {
    /// The number GitLab shows in the issue's web URL and expects on
    /// project-scoped endpoints; older servers only report `id`.
    pub fn reference(&self) -> IssueId {
        self.iid.unwrap_or(self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteDto {
    pub id: u64,
    #[serde(default)]
    pub body: CompactString,
}

/// Request body for `POST /projects/:id/issues`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: CompactString,
    pub description: CompactString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<CompactString>,
}

impl NewIssue {
    pub fn new(title: impl Into<CompactString>, description: impl Into<CompactString>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            labels: None,
        }
    }

    /// Attaches labels given as a comma separated list. Blank entries are
    /// dropped; an empty list leaves the issue unlabelled.
    pub fn with_labels(mut self, labels: &str) -> Self {
        let labels = labels
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .join(",");

        self.labels = (!labels.is_empty()).then(|| labels.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewNote<'a> {
    pub body: &'a str,
}

/// The parts of a host problem that end up in an issue title.
#[derive(Debug, Clone, Default)]
pub struct ProblemSummary {
    pub environment: CompactString,
    pub location: CompactString,
    pub message: CompactString,
}

impl ProblemSummary {
    pub fn issue_title(&self) -> CompactString {
        format_compact!(
            "[{}][{}] {}",
            self.environment,
            self.location,
            truncate(&self.message, TITLE_MESSAGE_LIMIT)
        )
    }
}

fn truncate(s: &str, limit: usize) -> CompactString {
    const OMISSION: &str = "...";

    if s.chars().count() <= limit {
        return s.into();
    }

    let keep = limit.saturating_sub(OMISSION.len());
    let mut out: CompactString = s.chars().take(keep).collect();
    out.push_str(OMISSION);
    out
}
