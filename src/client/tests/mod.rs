//! Test utilities and common test fixtures for client modules

use serde_json::json;

mod integration_tests;

/// Create JSON representation of a user
pub fn user_json() -> serde_json::Value {
    json!({
        "id": 1,
        "username": "errbit",
        "name": "Errbit Bot",
        "state": "active"
    })
}

/// Create JSON representation of a page of projects
pub fn projects_json(projects: &[(u64, &str)]) -> serde_json::Value {
    projects
        .iter()
        .map(|&(id, path)| {
            json!({
                "id": id,
                "path_with_namespace": path,
                "name": path.rsplit('/').next().unwrap_or(path),
                "web_url": format!("https://gitlab.example.com/{path}")
            })
        })
        .collect()
}

/// Create JSON representation of a created issue
pub fn issue_json(id: u64, iid: u64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "iid": iid,
        "project_id": 42,
        "title": title,
        "state": "opened",
        "web_url": format!("https://gitlab.example.com/group/project/-/issues/{iid}"),
        "created_at": "2024-03-01T12:00:00.000Z"
    })
}

/// Create GitLab API error response
pub fn gitlab_error_response(error: &str, description: Option<&str>) -> serde_json::Value {
    let mut json = json!({
        "error": error
    });

    if let Some(desc) = description {
        json["error_description"] = json!(desc);
    }

    json
}

/// Create GitLab API error response (format 2)
pub fn gitlab_error_response_2(message: &str) -> serde_json::Value {
    json!({
        "message": message
    })
}

/// Mock HTTP server for testing
pub struct MockServer {
    pub server: wiremock::MockServer,
}

impl MockServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        let server = wiremock::MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock server
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Create a test config pointing to this mock server
    pub fn test_config(&self) -> crate::client::config::ClientConfig {
        crate::client::config::ClientConfig::new(self.base_url(), "test-token")
    }
}
