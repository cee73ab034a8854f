//! Files error reports as GitLab issues.
//!
//! A host application hands [`GitlabIssueTracker`] its configuration as a
//! [`TrackerParams`] map, checks it with
//! [`validate`](GitlabIssueTracker::validate) and then calls
//! [`create_issue`](GitlabIssueTracker::create_issue) for every problem it
//! wants tracked:
//!
//! ```no_run
//! use gitlab_issue_tracker::{GitlabIssueTracker, TrackerParams};
//!
//! # async fn run() -> gitlab_issue_tracker::Result<()> {
//! let params = TrackerParams::new()
//!     .with("endpoint", "https://gitlab.example.com/api/v4")
//!     .with("api_token", "glpat-...")
//!     .with("path_with_namespace", "group/project");
//!
//! let tracker = GitlabIssueTracker::new(params);
//! if tracker.validate().await.is_empty() {
//!     let issue = tracker.create_issue("[production] NoMethodError", "backtrace").await?;
//!     println!("{}", issue.url);
//!     tracker.create_comment(issue.reference, "seen again").await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod id;
pub mod logging;
pub mod registry;
pub mod result;
pub mod tracker;

pub use domain::ProblemSummary;
pub use registry::{register_builtin, TrackerDescriptor};
pub use result::{Result, TrackerError};
pub use tracker::{
    legacy::LegacyIssueTracker, CreatedIssue, FieldDescriptor, GitlabIssueTracker, TrackerParams,
    ValidationError,
};
