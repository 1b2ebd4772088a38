//! Provider capability interface
//!
//! Everything the ACL engine needs from a Git-hosting service, expressed once
//! and implemented per provider. The engine is written against [`Provider`]
//! and never branches on which service is behind it.
//!
//! | capability | absence is reported as |
//! |---|---|
//! | [`Provider::list_issue_comments`] | an empty list |
//! | [`Provider::is_collaborator`] | `Ok(false)` |
//! | [`Provider::get_file_content`] | `Err(ProviderError::NotFound)` |
//!
//! Any other error is a transport or authentication fault.

pub mod bitbucket;
pub mod client;
pub mod gitea;
pub mod github;
pub mod gitlab;
pub(crate) mod rest;

pub use bitbucket::BitbucketProvider;
pub use client::ApiClient;
pub use gitea::GiteaProvider;
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;

use crate::auth::create_auth_provider;
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{AppError, ProviderResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One comment of an issue or pull request thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub body: String,
    pub author_login: String,
}

impl CommentRecord {
    pub fn new(body: impl Into<String>, author_login: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            author_login: author_login.into(),
        }
    }
}

/// Capabilities a Git-hosting integration must offer the ACL engine
// async_trait required for dyn-compatibility with Arc<dyn Provider>
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Comments on an issue or pull request, oldest first
    async fn list_issue_comments(
        &self,
        org: &str,
        repo: &str,
        issue_id: u64,
    ) -> ProviderResult<Vec<CommentRecord>>;

    /// Whether `login` has at least write access to the repository
    async fn is_collaborator(&self, org: &str, repo: &str, login: &str) -> ProviderResult<bool>;

    /// Raw content of `path` at `git_ref`; an empty ref means the default branch
    async fn get_file_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> ProviderResult<Vec<u8>>;
}

/// Shared provider handle
pub type SharedProvider = Arc<dyn Provider>;

/// Build the configured provider adapter
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider, AppError> {
    let auth = create_auth_provider(config)?;
    let client = ApiClient::new(config, auth)?;

    Ok(match config.kind {
        ProviderKind::GitHub => Arc::new(GitHubProvider::new(client)),
        ProviderKind::Gitea => Arc::new(GiteaProvider::new(client)),
        ProviderKind::GitLab => Arc::new(GitLabProvider::new(client)),
        ProviderKind::Bitbucket => Arc::new(BitbucketProvider::new(client)),
    })
}

/// Decode the base64 `content` field of a contents API envelope
///
/// GitHub wraps the encoded text at 60 columns, so whitespace is stripped
/// before decoding.
pub(crate) fn decode_base64_content(content: &str) -> ProviderResult<Vec<u8>> {
    use base64::Engine;

    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| {
            crate::error::ProviderError::InvalidResponse(format!(
                "Failed to decode base64 content: {}",
                e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::SecretString;

    #[test]
    fn test_decode_wrapped_base64() {
        // base64("approvers:\n  - alice\n") split over two lines
        let wrapped = "YXBwcm92ZXJzOgogIC0g\nYWxpY2UK\n";
        let decoded = decode_base64_content(wrapped).unwrap();
        assert_eq!(decoded, b"approvers:\n  - alice\n");
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert!(decode_base64_content("%%%").is_err());
    }

    #[test]
    fn test_create_provider_per_kind() {
        for kind in [
            ProviderKind::GitHub,
            ProviderKind::Gitea,
            ProviderKind::GitLab,
            ProviderKind::Bitbucket,
        ] {
            let config = ProviderConfig {
                kind,
                token: Some(SecretString::new("token")),
                ..Default::default()
            };
            let provider = create_provider(&config).unwrap();
            assert_eq!(provider.kind(), kind);
        }
    }

    #[test]
    fn test_create_provider_requires_token() {
        let config = ProviderConfig::default();
        assert!(matches!(
            create_provider(&config),
            Err(AppError::Auth(crate::error::AuthError::NotConfigured))
        ));
    }
}
