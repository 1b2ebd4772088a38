//! Shared fixtures for integration tests

#![allow(dead_code)]

use base64::Engine;
use serde_json::json;
use trigger_gate::acl::AclEngine;
use trigger_gate::config::{AclConfig, ProviderConfig, ProviderKind};
use trigger_gate::event::{
    Event, IssueCommentPayload, IssueLink, Payload, PullRequestLink, PullRequestPayload,
    TriggerTarget,
};
use trigger_gate::provider::{SharedProvider, create_provider};
use trigger_gate::util::SecretString;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

/// Provider configuration pointing at a mock server, without retries
pub fn provider_config(server: &MockServer, kind: ProviderKind) -> ProviderConfig {
    ProviderConfig {
        kind,
        url: server.uri(),
        api_url: Some(server.uri()),
        token: Some(SecretString::new(TEST_TOKEN)),
        max_retries: 0,
        ..Default::default()
    }
}

pub fn provider(server: &MockServer, kind: ProviderKind) -> SharedProvider {
    create_provider(&provider_config(server, kind)).unwrap()
}

/// Gitea-backed engine with default ACL settings
pub fn gitea_engine(server: &MockServer) -> AclEngine {
    gitea_engine_with(server, AclConfig::default())
}

pub fn gitea_engine_with(server: &MockServer, settings: AclConfig) -> AclEngine {
    AclEngine::new(provider(server, ProviderKind::Gitea), settings)
}

pub fn event(org: &str, repo: &str, sender: &str) -> Event {
    Event {
        organization: org.to_string(),
        repository: repo.to_string(),
        sender: sender.to_string(),
        default_branch: "main".to_string(),
        base_branch: "main".to_string(),
        ..Default::default()
    }
}

/// An `ok-to-test-comment` event on issue 1
pub fn ok_to_test_event(org: &str, repo: &str, sender: &str) -> Event {
    Event {
        trigger_target: TriggerTarget::OkToTestComment,
        payload: issue_comment_payload(&format!("http://url.com/{}/{}/1", org, repo)),
        ..event(org, repo, sender)
    }
}

pub fn issue_comment_payload(url: &str) -> Payload {
    Payload::IssueComment(IssueCommentPayload {
        issue: IssueLink {
            url: url.to_string(),
        },
        comment: None,
    })
}

pub fn pull_request_payload(url: &str) -> Payload {
    Payload::PullRequest(PullRequestPayload {
        pull_request: PullRequestLink {
            html_url: url.to_string(),
        },
    })
}

/// Serve `(author, body)` comments for an issue
pub async fn mount_comments(
    server: &MockServer,
    org: &str,
    repo: &str,
    issue: u64,
    comments: &[(&str, &str)],
) {
    let body: Vec<_> = comments
        .iter()
        .map(|(author, body)| json!({"body": body, "user": {"login": author}}))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/issues/{}/comments", org, repo, issue)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer 204 to the collaborator probe for `login`
pub async fn mount_collaborator(server: &MockServer, org: &str, repo: &str, login: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/collaborators/{}", org, repo, login)))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// Serve a policy file through the contents API, only at `git_ref`
pub async fn mount_file(
    server: &MockServer,
    org: &str,
    repo: &str,
    file: &str,
    git_ref: &str,
    content: &str,
) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/contents/{}", org, repo, file)))
        .and(query_param("ref", git_ref))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": file,
            "type": "file",
            "encoding": "base64",
            "content": base64::engine::general_purpose::STANDARD.encode(content),
        })))
        .mount(server)
        .await;
}

/// Serve an OWNERS file listing `approvers`, only at `git_ref`
pub async fn mount_owners(
    server: &MockServer,
    org: &str,
    repo: &str,
    git_ref: &str,
    approvers: &[&str],
) {
    let mut content = String::from("approvers:\n");
    for approver in approvers {
        content.push_str(&format!("  - {}\n", approver));
    }
    mount_file(server, org, repo, "OWNERS", git_ref, &content).await;
}
