//! Core HTTP client for GitLab API

use std::time::Duration;

use chrono::Local;
use compact_str::{format_compact, CompactString};
use reqwest::{
    header::{HeaderMap, RETRY_AFTER},
    Client, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{
    config::{ClientConfig, ProjectQuery},
    error::{ClientError, Result},
    pagination::Page,
    RemoteIssueClient,
};
use crate::{
    domain::{IssueDto, NewIssue, NewNote, NoteDto, ProjectDto, UserDto},
    id::{IssueId, ProjectId},
};

const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Pure HTTP client for GitLab API
#[derive(Debug, Clone)]
pub struct GitlabApi {
    client: Client,
    config: ClientConfig,
}

/// GitLab API error response formats
#[derive(Debug, Deserialize)]
struct GitlabApiError {
    error: CompactString,
    error_description: Option<CompactString>,
}

#[derive(Debug, Deserialize)]
struct GitlabApiError2 {
    message: serde_json::Value,
}

impl GitlabApi {
    /// Create a new GitLab API client
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request.timeout)
            .user_agent(config.request.user_agent.as_str())
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { client, config })
    }

    /// Get one page of the projects visible to the token's user
    #[instrument(skip(self), fields(page = %query.page, per_page = %query.per_page))]
    pub async fn get_projects(&self, query: &ProjectQuery) -> Result<Page<ProjectDto>> {
        let url = self.build_projects_url(query);
        let response = self.authenticated(self.client.get(url.as_str())).send().await?;
        let next_page = next_page_header(response.headers());

        let items: Vec<ProjectDto> = self.handle_response(response).await?;
        let next_page = next_page.unwrap_or_else(|| {
            // servers that omit pagination headers: a full page may have a successor
            (items.len() as u32 >= query.per_page).then_some(query.page + 1)
        });

        debug!(project_count = items.len(), next_page = ?next_page, "Fetched project page");
        Ok(Page { items, next_page })
    }

    // Private helper methods

    /// Perform authenticated GET request and deserialize JSON response
    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.authenticated(self.client.get(url)).send().await?;
        self.handle_response(response).await
    }

    /// Perform authenticated POST request with a JSON body
    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .authenticated(self.client.post(url))
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("PRIVATE-TOKEN", self.config.private_token.as_str())
    }

    /// Handle HTTP response and deserialize JSON
    async fn handle_response<T>(&self, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url_path = response.url().path().to_string();
        let status = response.status();
        let retry_after = retry_after_header(response.headers());
        let body = response.text().await?;

        if self.config.debug.log_responses {
            self.log_response_to_file(&url_path, &body);
        }

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ClientError::json_parse(url_path, e))
        } else {
            Self::handle_error_response(status.as_u16(), retry_after, &body)
        }
    }

    /// Handle error responses from GitLab API
    fn handle_error_response<T>(
        status: u16,
        retry_after: Option<Duration>,
        body: &str,
    ) -> Result<T> {
        match status {
            401 => Err(ClientError::Authentication),
            404 => Err(ClientError::not_found("Resource")),
            429 => Err(ClientError::rate_limit(retry_after)),
            _ => {
                if let Ok(api_error) = serde_json::from_str::<GitlabApiError>(body) {
                    Err(ClientError::gitlab_api(format_compact!(
                        "HTTP {}: {} {}",
                        status,
                        api_error.error,
                        api_error.error_description.unwrap_or_default()
                    )))
                } else if let Ok(api_error2) = serde_json::from_str::<GitlabApiError2>(body) {
                    // `message` is a string, or an object of field errors on 400s
                    let message = match api_error2.message {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    Err(ClientError::gitlab_api(format_compact!("HTTP {}: {}", status, message)))
                } else {
                    Err(ClientError::gitlab_api(format_compact!("HTTP {}: {}", status, body)))
                }
            },
        }
    }

    /// Build URL for projects endpoint
    fn build_projects_url(&self, query: &ProjectQuery) -> CompactString {
        let mut url = format_compact!("{}/projects?", self.config.base_url);

        if query.membership {
            url.push_str("membership=true&");
        }

        if query.simple {
            url.push_str("simple=true&");
        }

        if !query.archived {
            url.push_str("archived=false&");
        }

        url.push_str(&format_compact!("per_page={}&page={}", query.per_page, query.page));

        url
    }

    /// Log HTTP response to file for debugging
    fn log_response_to_file(&self, path: &str, body: &str) {
        if let Some(log_dir) = &self.config.debug.log_directory {
            if !log_dir.exists() {
                if let Err(e) = std::fs::create_dir_all(log_dir) {
                    warn!("Failed to create log directory: {}", e);
                    return;
                }
            }

            let filename = format!(
                "{}_{}.json",
                Local::now().format("%Y-%m-%d_%H-%M-%S"),
                path.replace('/', "_")
            );

            let log_path = log_dir.join(filename);

            if let Err(e) = std::fs::write(&log_path, body) {
                warn!("Failed to write response log to {:?}: {}", log_path, e);
            } else {
                debug!("Response logged to {:?}", log_path);
            }
        }
    }
}

impl RemoteIssueClient for GitlabApi {
    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<UserDto> {
        let url = format_compact!("{}/user", self.config.base_url);
        self.get_json(&url).await
    }

    async fn projects_page(&self, page: u32) -> Result<Page<ProjectDto>> {
        let query = self.config.default_project_query().with_page(page);
        self.get_projects(&query).await
    }

    #[instrument(skip(self, issue), fields(project_id = %project_id))]
    async fn create_issue(&self, project_id: ProjectId, issue: &NewIssue) -> Result<IssueDto> {
        let url = format_compact!("{}/projects/{}/issues", self.config.base_url, project_id);
        let created: IssueDto = self.post_json(&url, issue).await?;

        debug!(issue_id = %created.id, "Created issue");
        Ok(created)
    }

    #[instrument(skip(self, body), fields(project_id = %project_id, issue = %issue))]
    async fn create_issue_note(
        &self,
        project_id: ProjectId,
        issue: IssueId,
        body: &str,
    ) -> Result<NoteDto> {
        let url = format_compact!(
            "{}/projects/{}/issues/{}/notes",
            self.config.base_url,
            project_id,
            issue
        );
        self.post_json(&url, &NewNote { body }).await
    }
}

/// `X-Next-Page` is present but empty on the last page.
fn next_page_header(headers: &HeaderMap) -> Option<Option<u32>> {
    let value = headers.get(NEXT_PAGE_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        Some(None)
    } else {
        value.parse::<u32>().ok().map(Some)
    }
}

fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
