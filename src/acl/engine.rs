//! Trust decision engine
//!
//! Evaluation order for a candidate login (first match wins):
//! 1. The login is the organization itself
//! 2. The login is a repository collaborator with write access
//! 3. The login is an approver in OWNERS on the default branch,
//!    optionally expanded through OWNERS_ALIASES
//!
//! `ok-to-test-comment` events evaluate the authors of `/ok-to-test`
//! comments on the pull request instead of the event sender.

use crate::acl::comments::approving_authors;
use crate::acl::owners::{OWNERS_ALIASES_FILE, OWNERS_FILE, OwnersAliases, OwnersFile};
use crate::config::AclConfig;
use crate::error::{AclError, AclResult, ProviderResult};
use crate::event::{Event, TriggerTarget};
use crate::provider::SharedProvider;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// What established trust in a login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustSource {
    /// The login is the organization (or user namespace) owning the repository
    Owner,
    Collaborator,
    OwnersFile,
    /// A trusted login commented `/ok-to-test`
    OkToTestComment,
}

impl TrustSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrustSource::Owner => "owner",
            TrustSource::Collaborator => "collaborator",
            TrustSource::OwnersFile => "owners_file",
            TrustSource::OkToTestComment => "ok_to_test_comment",
        }
    }
}

impl fmt::Display for TrustSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a trust evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclDecision {
    /// `login` is the trusted identity that granted access
    Allowed { login: String, source: TrustSource },
    Denied,
}

impl AclDecision {
    fn allowed(login: &str, source: TrustSource) -> Self {
        AclDecision::Allowed {
            login: login.to_string(),
            source,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AclDecision::Allowed { .. })
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AclDecision::Denied)
    }
}

/// ACL engine
///
/// Holds no per-decision state; share it behind an `Arc` and call it
/// concurrently.
pub struct AclEngine {
    provider: SharedProvider,
    settings: AclConfig,
}

impl AclEngine {
    pub fn new(provider: SharedProvider, settings: AclConfig) -> Self {
        Self { provider, settings }
    }

    /// Decide whether the event may trigger CI
    pub async fn is_allowed(&self, cancel: &CancellationToken, event: &Event) -> AclResult<bool> {
        Ok(self.decide(cancel, event).await?.is_allowed())
    }

    /// Decide whether the event may trigger CI, reporting who granted trust
    ///
    /// Policy outcomes are never errors. `Err` means a provider call failed,
    /// a policy file could not be parsed, or `cancel` fired first.
    #[instrument(skip_all, fields(
        org = %event.organization,
        repo = %event.repository,
        sender = %event.sender,
        target = %event.trigger_target
    ))]
    pub async fn decide(&self, cancel: &CancellationToken, event: &Event) -> AclResult<AclDecision> {
        if cancel.is_cancelled() {
            return Err(AclError::Cancelled);
        }

        let decision = match event.trigger_target {
            TriggerTarget::OkToTestComment => self.check_ok_to_test(cancel, event).await?,
            TriggerTarget::Default => {
                let decision = self
                    .check_all(
                        cancel,
                        &event.organization,
                        &event.repository,
                        &event.default_branch,
                        &event.sender,
                    )
                    .await?;

                if decision.is_denied()
                    && self.settings.remember_ok_to_test
                    && event.payload.is_pull_request()
                {
                    debug!("Sender not trusted, looking for a previous /ok-to-test");
                    self.check_ok_to_test(cancel, event).await?
                } else {
                    decision
                }
            }
        };

        match &decision {
            AclDecision::Allowed { login, source } => {
                info!(login = %login, source = %source, "Trigger allowed")
            }
            AclDecision::Denied => info!("Trigger denied"),
        }

        Ok(decision)
    }

    /// Evaluate one candidate login against the repository's trust sources
    pub async fn check_all(
        &self,
        cancel: &CancellationToken,
        org: &str,
        repo: &str,
        default_branch: &str,
        login: &str,
    ) -> AclResult<AclDecision> {
        if login.is_empty() {
            return Ok(AclDecision::Denied);
        }

        if login == org {
            return Ok(AclDecision::allowed(login, TrustSource::Owner));
        }

        if guarded(cancel, self.provider.is_collaborator(org, repo, login)).await? {
            return Ok(AclDecision::allowed(login, TrustSource::Collaborator));
        }

        if self
            .owners_approves(cancel, org, repo, default_branch, login)
            .await?
        {
            return Ok(AclDecision::allowed(login, TrustSource::OwnersFile));
        }

        debug!(login, "No trust source matched");
        Ok(AclDecision::Denied)
    }

    /// Trust granted by an `/ok-to-test` comment from a trusted author
    async fn check_ok_to_test(
        &self,
        cancel: &CancellationToken,
        event: &Event,
    ) -> AclResult<AclDecision> {
        let Some(issue_id) = event.payload.issue_number() else {
            debug!(payload = event.payload.kind(), "Payload does not reference an issue");
            return Ok(AclDecision::Denied);
        };

        let comments = guarded(
            cancel,
            self.provider
                .list_issue_comments(&event.organization, &event.repository, issue_id),
        )
        .await?;

        for author in approving_authors(&comments) {
            let verdict = self
                .check_all(
                    cancel,
                    &event.organization,
                    &event.repository,
                    &event.default_branch,
                    author,
                )
                .await?;

            if verdict.is_allowed() {
                return Ok(AclDecision::allowed(author, TrustSource::OkToTestComment));
            }
            debug!(author, "Ignoring /ok-to-test from untrusted author");
        }

        Ok(AclDecision::Denied)
    }

    async fn owners_approves(
        &self,
        cancel: &CancellationToken,
        org: &str,
        repo: &str,
        git_ref: &str,
        login: &str,
    ) -> AclResult<bool> {
        let Some(content) = self.fetch_policy(cancel, org, repo, OWNERS_FILE, git_ref).await? else {
            return Ok(false);
        };

        let owners = OwnersFile::parse(&content)?;
        if owners.is_approver(login) {
            return Ok(true);
        }
        if !self.settings.owners_aliases || owners.approvers.is_empty() {
            return Ok(false);
        }

        let Some(content) = self
            .fetch_policy(cancel, org, repo, OWNERS_ALIASES_FILE, git_ref)
            .await?
        else {
            return Ok(false);
        };

        let aliases = OwnersAliases::parse(&content)?;
        Ok(owners.is_approver_with(login, &aliases))
    }

    /// Fetch a policy file; a missing file is `None`
    async fn fetch_policy(
        &self,
        cancel: &CancellationToken,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> AclResult<Option<Vec<u8>>> {
        match guarded(
            cancel,
            self.provider.get_file_content(org, repo, path, git_ref),
        )
        .await
        {
            Ok(content) => Ok(Some(content)),
            Err(AclError::Provider(e)) if e.is_not_found() => {
                debug!(path, git_ref, "Policy file not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Race a provider call against cancellation
async fn guarded<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = ProviderResult<T>>,
) -> AclResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AclError::Cancelled),
        result = call => result.map_err(AclError::from),
    }
}
