//! `/repos/{owner}/{repo}/...` endpoints shared by GitHub and Gitea
//!
//! Gitea mirrors GitHub's REST layout for everything the ACL engine touches;
//! the two adapters differ only in API base path and pagination parameter.

use crate::error::{ProviderError, ProviderResult};
use crate::provider::client::ApiClient;
use crate::provider::{CommentRecord, decode_base64_content};
use crate::util::{QueryBuilder, encode_segment};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct IssueComment {
    #[serde(default)]
    body: String,
    user: CommentUser,
}

#[derive(Debug, Deserialize)]
struct CommentUser {
    login: String,
}

/// Contents API envelope
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// Page size parameter name and value for a listing
pub(crate) struct PageSize {
    pub param: &'static str,
    pub size: u32,
}

pub(crate) async fn list_issue_comments(
    client: &ApiClient,
    org: &str,
    repo: &str,
    issue_id: u64,
    page: PageSize,
) -> ProviderResult<Vec<CommentRecord>> {
    let endpoint = format!(
        "/repos/{}/{}/issues/{}/comments{}",
        encode_segment(org),
        encode_segment(repo),
        issue_id,
        QueryBuilder::new().param(page.param, page.size).build()
    );

    let comments: Vec<IssueComment> = client.get_paged(&endpoint).await?;
    Ok(comments
        .into_iter()
        .map(|c| CommentRecord::new(c.body, c.user.login))
        .collect())
}

pub(crate) async fn is_collaborator(
    client: &ApiClient,
    org: &str,
    repo: &str,
    login: &str,
) -> ProviderResult<bool> {
    let endpoint = format!(
        "/repos/{}/{}/collaborators/{}",
        encode_segment(org),
        encode_segment(repo),
        encode_segment(login)
    );

    let status = client.get_status(&endpoint).await?;
    debug!(login, status = status.as_u16(), "Collaborator probe");
    membership_from_status(status)
}

/// Interpret a collaborator probe status
///
/// 204 means member. Authentication, rate limiting and server failures are
/// errors. Anything else, 404 included, means not a member.
pub(crate) fn membership_from_status(status: StatusCode) -> ProviderResult<bool> {
    match status {
        StatusCode::NO_CONTENT => Ok(true),
        StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::TOO_MANY_REQUESTS => {
            Err(ProviderError::from_response(status.as_u16(), ""))
        }
        s if s.is_server_error() => Err(ProviderError::from_response(s.as_u16(), "")),
        _ => Ok(false),
    }
}

pub(crate) async fn get_file_content(
    client: &ApiClient,
    org: &str,
    repo: &str,
    path: &str,
    git_ref: &str,
) -> ProviderResult<Vec<u8>> {
    let endpoint = format!(
        "/repos/{}/{}/contents/{}{}",
        encode_segment(org),
        encode_segment(repo),
        encode_path(path),
        QueryBuilder::new().non_empty("ref", git_ref).build()
    );

    let response: ContentsResponse = client
        .get(&endpoint)
        .await
        .map_err(|e| e.with_resource(format!("{}@{}", path, git_ref)))?;

    match (response.content, response.encoding.as_deref()) {
        (Some(content), Some("base64") | None) => decode_base64_content(&content),
        (Some(_), Some(other)) => Err(ProviderError::InvalidResponse(format!(
            "Unsupported content encoding '{}' for {}",
            other, path
        ))),
        // Directories and submodules come back without content
        (None, _) => Err(ProviderError::NotFound {
            resource: format!("{}@{}", path, git_ref),
        }),
    }
}

/// Encode a repository file path, keeping `/` separators
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
