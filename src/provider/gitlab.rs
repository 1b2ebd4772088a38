//! GitLab provider adapter (API v4)
//!
//! GitLab addresses repositories as URL-encoded `namespace/project` paths,
//! calls comments "notes" and expresses permissions as numeric access levels.

use crate::config::ProviderKind;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::client::ApiClient;
use crate::provider::{CommentRecord, Provider, decode_base64_content};
use crate::util::{QueryBuilder, encode_segment};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Developer: the lowest role allowed to push
const DEVELOPER_ACCESS: u32 = 30;

const PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct Note {
    #[serde(default)]
    body: String,
    author: NoteAuthor,
    /// Notes generated by GitLab itself ("added 1 commit", label changes, ...)
    #[serde(default)]
    system: bool,
}

#[derive(Debug, Deserialize)]
struct NoteAuthor {
    username: String,
}

#[derive(Debug, Deserialize)]
struct Member {
    username: String,
    access_level: u32,
}

#[derive(Debug, Deserialize)]
struct RepositoryFile {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

pub struct GitLabProvider {
    client: ApiClient,
}

impl GitLabProvider {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// URL-encode a project path for use in API endpoints
    pub fn encode_project(org: &str, repo: &str) -> String {
        encode_segment(&format!("{}/{}", org, repo))
    }
}

#[async_trait]
impl Provider for GitLabProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitLab
    }

    /// Merge request notes, oldest first, without system notes
    #[instrument(skip(self))]
    async fn list_issue_comments(
        &self,
        org: &str,
        repo: &str,
        issue_id: u64,
    ) -> ProviderResult<Vec<CommentRecord>> {
        let endpoint = format!(
            "/projects/{}/merge_requests/{}/notes{}",
            Self::encode_project(org, repo),
            issue_id,
            QueryBuilder::new()
                .param("sort", "asc")
                .param("order_by", "created_at")
                .param("per_page", PER_PAGE)
                .build()
        );

        let notes: Vec<Note> = self.client.get_paged(&endpoint).await?;
        Ok(notes
            .into_iter()
            .filter(|n| !n.system)
            .map(|n| CommentRecord::new(n.body, n.author.username))
            .collect())
    }

    /// Direct and inherited members with at least Developer access
    #[instrument(skip(self))]
    async fn is_collaborator(&self, org: &str, repo: &str, login: &str) -> ProviderResult<bool> {
        let endpoint = format!(
            "/projects/{}/members/all{}",
            Self::encode_project(org, repo),
            QueryBuilder::new()
                .param("query", login)
                .param("per_page", PER_PAGE)
                .build()
        );

        let members: Vec<Member> = match self.client.get_paged(&endpoint).await {
            Ok(members) => members,
            Err(ProviderError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };

        // `query` is a fuzzy match on name and username
        let level = members
            .iter()
            .find(|m| m.username == login)
            .map(|m| m.access_level);
        debug!(login, access_level = ?level, "Membership lookup");

        Ok(level.is_some_and(|l| l >= DEVELOPER_ACCESS))
    }

    #[instrument(skip(self))]
    async fn get_file_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> ProviderResult<Vec<u8>> {
        // The files API requires a ref; HEAD resolves to the default branch
        let git_ref = if git_ref.is_empty() { "HEAD" } else { git_ref };
        let endpoint = format!(
            "/projects/{}/repository/files/{}{}",
            Self::encode_project(org, repo),
            encode_segment(path),
            QueryBuilder::new().param("ref", git_ref).build()
        );

        let file: RepositoryFile = self
            .client
            .get(&endpoint)
            .await
            .map_err(|e| e.with_resource(format!("{}@{}", path, git_ref)))?;

        match file.encoding.as_deref() {
            Some("base64") | None => decode_base64_content(&file.content),
            Some("text") => Ok(file.content.into_bytes()),
            Some(other) => Err(ProviderError::InvalidResponse(format!(
                "Unsupported content encoding '{}' for {}",
                other, path
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_project() {
        assert_eq!(
            GitLabProvider::encode_project("group", "project"),
            "group%2Fproject"
        );
        assert_eq!(
            GitLabProvider::encode_project("group/subgroup", "project"),
            "group%2Fsubgroup%2Fproject"
        );
    }
}
