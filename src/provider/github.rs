//! GitHub provider adapter (github.com and GitHub Enterprise Server)

use crate::config::ProviderKind;
use crate::error::ProviderResult;
use crate::provider::client::ApiClient;
use crate::provider::rest::{self, PageSize};
use crate::provider::{CommentRecord, Provider};
use async_trait::async_trait;
use tracing::instrument;

const PER_PAGE: u32 = 100;

pub struct GitHubProvider {
    client: ApiClient,
}

impl GitHubProvider {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    /// Pull request conversation comments live on the issues API
    #[instrument(skip(self))]
    async fn list_issue_comments(
        &self,
        org: &str,
        repo: &str,
        issue_id: u64,
    ) -> ProviderResult<Vec<CommentRecord>> {
        let page = PageSize {
            param: "per_page",
            size: PER_PAGE,
        };
        rest::list_issue_comments(&self.client, org, repo, issue_id, page).await
    }

    /// `GET /repos/{owner}/{repo}/collaborators/{username}` answers 204 for
    /// direct, organization and team collaborators alike
    #[instrument(skip(self))]
    async fn is_collaborator(&self, org: &str, repo: &str, login: &str) -> ProviderResult<bool> {
        rest::is_collaborator(&self.client, org, repo, login).await
    }

    #[instrument(skip(self))]
    async fn get_file_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> ProviderResult<Vec<u8>> {
        rest::get_file_content(&self.client, org, repo, path, git_ref).await
    }
}
