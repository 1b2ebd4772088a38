//! Gitea provider adapter (API v1)

use crate::config::ProviderKind;
use crate::error::ProviderResult;
use crate::provider::client::ApiClient;
use crate::provider::rest::{self, PageSize};
use crate::provider::{CommentRecord, Provider};
use async_trait::async_trait;
use tracing::instrument;

/// Gitea's default `MAX_RESPONSE_ITEMS`
const PAGE_LIMIT: u32 = 50;

pub struct GiteaProvider {
    client: ApiClient,
}

impl GiteaProvider {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for GiteaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gitea
    }

    #[instrument(skip(self))]
    async fn list_issue_comments(
        &self,
        org: &str,
        repo: &str,
        issue_id: u64,
    ) -> ProviderResult<Vec<CommentRecord>> {
        let page = PageSize {
            param: "limit",
            size: PAGE_LIMIT,
        };
        rest::list_issue_comments(&self.client, org, repo, issue_id, page).await
    }

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
