//! Integration tests for GitLab client modules

use std::time::Duration;

use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing},
    Mock, ResponseTemplate,
};

use crate::{
    client::{
        api::GitlabApi, error::ClientError, HttpConnector, RemoteIssueClient, RequestConfig,
    },
    domain::NewIssue,
    id::{IssueId, ProjectId},
    tracker::{
        fields::{API_TOKEN, ENDPOINT, LABELS, PATH_WITH_NAMESPACE},
        GitlabIssueTracker, TrackerParams, ValidationError,
    },
};

use super::{
    gitlab_error_response, gitlab_error_response_2, issue_json, projects_json, user_json,
    MockServer,
};

const PROBE_TOKEN: &str = "errbit-probe-invalid-token";

fn quick_connector() -> HttpConnector {
    HttpConnector::new(RequestConfig {
        timeout: Duration::from_secs(2),
        ..RequestConfig::default()
    })
}

fn tracker_params(mock_server: &MockServer, project: &str) -> TrackerParams {
    TrackerParams::new()
        .with(ENDPOINT, mock_server.base_url())
        .with(API_TOKEN, "test-token")
        .with(PATH_WITH_NAMESPACE, project)
}

async fn mount_user_probes(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("PRIVATE-TOKEN", PROBE_TOKEN))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(gitlab_error_response_2("401 Unauthorized")),
        )
        .mount(&mock_server.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("PRIVATE-TOKEN", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&mock_server.server)
        .await;
}

#[tokio::test]
async fn test_api_current_user_success() {
    let mock_server = MockServer::start().await;
    mount_user_probes(&mock_server).await;

    let api = GitlabApi::new(mock_server.test_config()).unwrap();
    let user = api.current_user().await.unwrap();

    assert_eq!(user.username, "errbit");
}

#[tokio::test]
async fn test_api_current_user_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(gitlab_error_response("invalid_token", None)),
        )
        .mount(&mock_server.server)
        .await;

    let api = GitlabApi::new(mock_server.test_config()).unwrap();
    let result = api.current_user().await;

    assert!(matches!(result, Err(ClientError::Authentication)));
}

#[tokio::test]
async fn test_api_projects_page_follows_next_page_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("PRIVATE-TOKEN", "test-token"))
        .and(query_param_is_missing("membership"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "2")
                .set_body_json(projects_json(&[(1, "group/one")])),
        )
        .mount(&mock_server.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "")
                .set_body_json(projects_json(&[(2, "group/two")])),
        )
        .mount(&mock_server.server)
        .await;

    let api = GitlabApi::new(mock_server.test_config()).unwrap();

    let first = api.projects_page(1).await.unwrap();
    assert_eq!(first.items[0].path_with_namespace, "group/one");
    assert_eq!(first.next_page, Some(2));

    let second = api.projects_page(2).await.unwrap();
    assert_eq!(second.items[0].id, ProjectId::new(2));
    assert_eq!(second.next_page, None);
}

#[tokio::test]
async fn test_api_project_cursor_walks_all_pages() {
    let mock_server = MockServer::start().await;

    for (page, next, projects) in [
        ("1", "2", vec![(1u64, "group/one"), (2, "group/two")]),
        ("2", "3", vec![(3, "group/three")]),
        ("3", "", vec![(4, "group/four")]),
    ] {
        Mock::given(method("GET"))
            .and(path("/projects"))
            .and(query_param("page", page))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-next-page", next)
                    .set_body_json(projects_json(&projects)),
            )
            .expect(1)
            .mount(&mock_server.server)
            .await;
    }

    let api = GitlabApi::new(mock_server.test_config()).unwrap();
    let mut cursor = api.projects();

    let mut paths = Vec::new();
    while let Some(project) = cursor.next().await.unwrap() {
        paths.push(project.path_with_namespace);
    }

    assert_eq!(paths, ["group/one", "group/two", "group/three", "group/four"]);
}

#[tokio::test]
async fn test_api_create_issue_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/42/issues"))
        .and(header("PRIVATE-TOKEN", "test-token"))
        .and(body_partial_json(json!({
            "title": "NoMethodError",
            "description": "stack trace",
            "labels": "errbit,bug"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(issue_json(900, 7, "NoMethodError")))
        .expect(1)
        .mount(&mock_server.server)
        .await;

    let api = GitlabApi::new(mock_server.test_config()).unwrap();
    let issue = NewIssue::new("NoMethodError", "stack trace").with_labels("errbit, bug");

    let created = api.create_issue(ProjectId::new(42), &issue).await.unwrap();

    assert_eq!(created.id, IssueId::new(900));
    assert_eq!(created.reference(), IssueId::new(7));
    assert!(created.created_at.is_some());
}

#[tokio::test]
async fn test_api_create_issue_note_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/42/issues/7/notes"))
        .and(body_partial_json(json!({ "body": "occurred again" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 55, "body": "occurred again" })),
        )
        .expect(1)
        .mount(&mock_server.server)
        .await;

    let api = GitlabApi::new(mock_server.test_config()).unwrap();
    let note = api
        .create_issue_note(ProjectId::new(42), IssueId::new(7), "occurred again")
        .await
        .unwrap();

    assert_eq!(note.id, 55);
}

#[tokio::test]
async fn test_api_create_issue_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/projects/42/issues"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(gitlab_error_response_2("403 Forbidden")),
        )
        .mount(&mock_server.server)
        .await;

    let api = GitlabApi::new(mock_server.test_config()).unwrap();
    let result = api.create_issue(ProjectId::new(42), &NewIssue::new("t", "b")).await;

    match result {
        Err(ClientError::GitlabApi { message }) => assert!(message.contains("403 Forbidden")),
        other => panic!("Expected GitlabApi error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_rejects_non_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Welcome</html>"))
        .mount(&mock_server.server)
        .await;

    let api = GitlabApi::new(mock_server.test_config()).unwrap();
    let result = api.current_user().await;

    assert!(matches!(result, Err(ClientError::JsonParse { .. })));
}

#[tokio::test]
async fn test_tracker_validates_against_gitlab() {
    let mock_server = MockServer::start().await;
    mount_user_probes(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("PRIVATE-TOKEN", "test-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "")
                .set_body_json(projects_json(&[(42, "group/project")])),
        )
        .mount(&mock_server.server)
        .await;

    let tracker = GitlabIssueTracker::with_connector(
        tracker_params(&mock_server, "group/project"),
        quick_connector(),
    );

    assert!(tracker.validate().await.is_empty());
}

async fn mount_public_project_listing(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(query_param("membership", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(projects_json(&[])))
        .mount(&mock_server.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(query_param_is_missing("membership"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "")
                .set_body_json(projects_json(&[(42, "public-group/project")])),
        )
        .mount(&mock_server.server)
        .await;
}

#[tokio::test]
async fn test_tracker_finds_projects_outside_memberships() {
    let mock_server = MockServer::start().await;
    mount_user_probes(&mock_server).await;
    mount_public_project_listing(&mock_server).await;

    let tracker = GitlabIssueTracker::with_connector(
        tracker_params(&mock_server, "public-group/project"),
        quick_connector(),
    );

    assert!(tracker.validate().await.is_empty());
}

#[tokio::test]
async fn test_tracker_membership_filter_is_opt_in() {
    let mock_server = MockServer::start().await;
    mount_user_probes(&mock_server).await;
    mount_public_project_listing(&mock_server).await;

    let connector = HttpConnector::new(RequestConfig {
        timeout: Duration::from_secs(2),
        membership_only: true,
        ..RequestConfig::default()
    });
    let tracker = GitlabIssueTracker::with_connector(
        tracker_params(&mock_server, "public-group/project"),
        connector,
    );

    assert_eq!(
        tracker.validate().await,
        vec![ValidationError::ProjectNotFound { path: "public-group/project".into() }]
    );
}

#[tokio::test]
async fn test_tracker_reports_missing_project() {
    let mock_server = MockServer::start().await;
    mount_user_probes(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(projects_json(&[(42, "group/project")])),
        )
        .mount(&mock_server.server)
        .await;

    let tracker = GitlabIssueTracker::with_connector(
        tracker_params(&mock_server, "group/missing-project"),
        quick_connector(),
    );

    let errors = tracker.validate().await;

    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("group/missing-project"));
}

#[tokio::test]
async fn test_tracker_reports_rejected_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server.server)
        .await;

    let tracker = GitlabIssueTracker::with_connector(
        tracker_params(&mock_server, "group/project"),
        quick_connector(),
    );

    assert_eq!(tracker.validate().await, vec![ValidationError::AuthenticationFailure]);
}

#[tokio::test]
async fn test_tracker_treats_non_gitlab_server_as_missing_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server.server)
        .await;

    let tracker = GitlabIssueTracker::with_connector(
        tracker_params(&mock_server, "group/project"),
        quick_connector(),
    );

    let errors = tracker.validate().await;

    assert!(matches!(errors[..], [ValidationError::EndpointUnreachable { .. }]));
}

#[tokio::test]
async fn test_tracker_treats_connection_error_as_missing_endpoint() {
    let params = TrackerParams::new()
        .with(ENDPOINT, "http://127.0.0.1:1")
        .with(API_TOKEN, "test-token")
        .with(PATH_WITH_NAMESPACE, "group/project");
    let tracker = GitlabIssueTracker::with_connector(params, quick_connector());

    let errors = tracker.validate().await;

    assert_eq!(
        errors,
        vec![ValidationError::EndpointUnreachable { endpoint: "http://127.0.0.1:1".into() }]
    );
}

#[tokio::test]
async fn test_tracker_creates_issue_and_lists_projects_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-next-page", "")
                .set_body_json(projects_json(&[(42, "group/project")])),
        )
        .expect(1)
        .mount(&mock_server.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects/42/issues"))
        .and(body_partial_json(json!({ "labels": "errbit" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(issue_json(900, 7, "Title A")))
        .expect(2)
        .mount(&mock_server.server)
        .await;

    let tracker = GitlabIssueTracker::with_connector(
        tracker_params(&mock_server, "group/project").with(LABELS, "errbit"),
        quick_connector(),
    );

    let first = tracker.create_issue("Title A", "Body A").await.unwrap();
    let second = tracker.create_issue("Title A", "Body A").await.unwrap();

    let expected = format!("{}/group/project/issues/7", mock_server.base_url());
    assert_eq!(first.url, expected.as_str());
    assert_eq!(second.url, expected.as_str());
    assert_eq!(first.reference, IssueId::new(7));
}

#[tokio::test]
async fn test_tracker_propagates_issue_creation_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(projects_json(&[(42, "group/project")])),
        )
        .mount(&mock_server.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/projects/42/issues"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server.server)
        .await;

    let tracker = GitlabIssueTracker::with_connector(
        tracker_params(&mock_server, "group/project"),
        quick_connector(),
    );

    let result = tracker.create_issue("t", "b").await;

    assert!(matches!(
        result,
        Err(crate::result::TrackerError::Client(ClientError::GitlabApi { .. }))
    ));
}
