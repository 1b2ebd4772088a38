//! Bitbucket Cloud provider adapter (API 2.0)
//!
//! Bitbucket identifies users by `account_id`; that is the login the
//! dispatcher puts in `Event::sender` and the value OWNERS files list.

use crate::config::ProviderKind;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::client::{ApiClient, MAX_PAGES};
use crate::provider::rest::encode_path;
use crate::provider::{CommentRecord, Provider};
use crate::util::{QueryBuilder, encode_segment};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

const PAGE_LEN: u32 = 100;

/// Paginated collection envelope
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Page<T> {
    #[serde(default)]
    values: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequestComment {
    content: CommentContent,
    #[serde(default)]
    user: Option<Account>,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct CommentContent {
    #[serde(default)]
    raw: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
}

impl Account {
    fn login(self) -> Option<String> {
        self.account_id.or(self.nickname)
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryPermission {
    permission: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    mainbranch: Option<Branch>,
}

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

pub struct BitbucketProvider {
    client: ApiClient,
}

impl BitbucketProvider {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Collect every page of a collection by following `next` links
    async fn collect_pages<T: DeserializeOwned>(&self, endpoint: &str) -> ProviderResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(endpoint.to_string());

        for _ in 0..MAX_PAGES {
            let Some(url) = next.take() else {
                return Ok(items);
            };
            let page: Page<T> = self.client.get(&url).await?;
            items.extend(page.values);
            next = page.next;
        }

        match next {
            Some(_) => Err(ProviderError::InvalidResponse(format!(
                "More than {} pages at {}",
                MAX_PAGES, endpoint
            ))),
            None => Ok(items),
        }
    }

    async fn main_branch(&self, workspace: &str, repo: &str) -> ProviderResult<String> {
        let endpoint = format!(
            "/repositories/{}/{}",
            encode_segment(workspace),
            encode_segment(repo)
        );
        let info: RepositoryInfo = self.client.get(&endpoint).await?;
        info.mainbranch
            .map(|b| b.name)
            .ok_or_else(|| ProviderError::NotFound {
                resource: format!("main branch of {}/{}", workspace, repo),
            })
    }
}

#[async_trait]
impl Provider for BitbucketProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Bitbucket
    }

    #[instrument(skip(self))]
    async fn list_issue_comments(
        &self,
        org: &str,
        repo: &str,
        issue_id: u64,
    ) -> ProviderResult<Vec<CommentRecord>> {
        let endpoint = format!(
            "/repositories/{}/{}/pullrequests/{}/comments{}",
            encode_segment(org),
            encode_segment(repo),
            issue_id,
            QueryBuilder::new()
                .param("sort", "created_on")
                .param("pagelen", PAGE_LEN)
                .build()
        );

        let comments: Vec<PullRequestComment> = self.collect_pages(&endpoint).await?;
        Ok(comments
            .into_iter()
            .filter(|c| !c.deleted)
            .filter_map(|c| {
                let login = c.user.and_then(Account::login)?;
                Some(CommentRecord::new(c.content.raw, login))
            })
            .collect())
    }

    /// Explicit repository permission of `write` or `admin`
    #[instrument(skip(self))]
    async fn is_collaborator(&self, org: &str, repo: &str, login: &str) -> ProviderResult<bool> {
        let filter = format!("user.account_id=\"{}\"", login.replace('"', ""));
        let endpoint = format!(
            "/workspaces/{}/permissions/repositories/{}{}",
            encode_segment(org),
            encode_segment(repo),
            QueryBuilder::new().param("q", filter).build()
        );

        let permissions: Vec<RepositoryPermission> = match self.collect_pages(&endpoint).await {
            Ok(permissions) => permissions,
            Err(ProviderError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };

        Ok(permissions
            .iter()
            .any(|p| p.permission == "write" || p.permission == "admin"))
    }

    #[instrument(skip(self))]
    async fn get_file_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> ProviderResult<Vec<u8>> {
        let git_ref = if git_ref.is_empty() {
            self.main_branch(org, repo).await?
        } else {
            git_ref.to_string()
        };

        let endpoint = format!(
            "/repositories/{}/{}/src/{}/{}",
            encode_segment(org),
            encode_segment(repo),
            encode_segment(&git_ref),
            encode_path(path)
        );

        self.client
            .get_bytes(&endpoint)
            .await
            .map_err(|e| e.with_resource(format!("{}@{}", path, git_ref)))
    }
}
