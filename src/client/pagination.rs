//! Lazy traversal of paginated GitLab listings

use tracing::trace;

use super::{error::Result, RemoteIssueClient};
use crate::domain::ProjectDto;

/// One page of a paginated listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page number to request next, `None` on the last page
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next_page: None }
    }
}

/// Walks the projects visible to a client, one page at a time.
///
/// Pages are only requested when the previously fetched ones are exhausted,
/// so a search that matches early never touches the remaining pages. Every
/// cursor starts over from the first page.
pub struct ProjectCursor<'a, C> {
    client: &'a C,
    buffered: std::vec::IntoIter<ProjectDto>,
    next_page: Option<u32>,
}

impl<'a, C: RemoteIssueClient> ProjectCursor<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            buffered: Vec::new().into_iter(),
            next_page: Some(1),
        }
    }

    /// The next project, or `None` once the listing is exhausted
    pub async fn next(&mut self) -> Result<Option<ProjectDto>> {
        loop {
            if let Some(project) = self.buffered.next() {
                return Ok(Some(project));
            }

            let Some(page) = self.next_page else {
                return Ok(None);
            };

            trace!(page, "Requesting project page");
            let fetched = self.client.projects_page(page).await?;

            // a server pointing backwards would loop forever
            self.next_page = fetched.next_page.filter(|next| *next > page);
            self.buffered = fetched.items.into_iter();
        }
    }

    /// Consumes the cursor until `predicate` matches
    pub async fn find<P>(mut self, mut predicate: P) -> Result<Option<ProjectDto>>
    where
        P: FnMut(&ProjectDto) -> bool,
    {
        while let Some(project) = self.next().await? {
            if predicate(&project) {
                return Ok(Some(project));
            }
        }

        Ok(None)
    }
}
