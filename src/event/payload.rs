//! Provider payload shapes carried by an [`Event`](super::Event)
//!
//! The dispatcher decodes the provider webhook and keeps only the parts the
//! trust decision can use. Each variant is a distinct shape; callers reach
//! shape-specific data through accessors that return `None` when the shape
//! does not carry it.

use serde::{Deserialize, Serialize};

/// Original payload, tagged by shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    #[default]
    Empty,
    IssueComment(IssueCommentPayload),
    PullRequest(PullRequestPayload),
    Repository(RepositoryPayload),
    Push(PushPayload),
    /// Any shape the dispatcher forwards that carries nothing usable here
    #[serde(other)]
    Other,
}

/// A comment created on an issue or pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentPayload {
    #[serde(default)]
    pub issue: IssueLink,
    #[serde(default)]
    pub comment: Option<PayloadComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    /// API or web URL of the issue / pull request; the trailing segment is its number
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadComment {
    pub body: String,
    pub user: PayloadUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadUser {
    pub login: String,
}

/// A pull request opened, synchronized, reopened...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub pull_request: PullRequestLink,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestLink {
    #[serde(default)]
    pub html_url: String,
}

/// Repository-level event with no issue attached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPayload {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub after: Option<String>,
}

impl Payload {
    /// URL of the issue or pull request this payload refers to
    ///
    /// Only comment and pull request shapes carry one. A blank URL counts as
    /// absent.
    pub fn issue_url(&self) -> Option<&str> {
        let url = match self {
            Payload::IssueComment(p) => p.issue.url.as_str(),
            Payload::PullRequest(p) => p.pull_request.html_url.as_str(),
            Payload::Empty | Payload::Repository(_) | Payload::Push(_) | Payload::Other => {
                return None;
            }
        };
        Some(url).filter(|u| !u.trim().is_empty())
    }

    /// Issue or pull request number derived from [`Payload::issue_url`]
    pub fn issue_number(&self) -> Option<u64> {
        self.issue_url().and_then(issue_number_from_url)
    }

    pub fn is_pull_request(&self) -> bool {
        matches!(self, Payload::PullRequest(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::IssueComment(_) => "issue_comment",
            Payload::PullRequest(_) => "pull_request",
            Payload::Repository(_) => "repository",
            Payload::Push(_) => "push",
            Payload::Other => "other",
        }
    }
}

/// Extract the trailing numeric path segment of an issue or pull request URL
///
/// `http://url.com/owner/repo/1` gives `1`. Query strings and fragments are
/// ignored; a non-numeric tail gives `None`.
pub fn issue_number_from_url(url: &str) -> Option<u64> {
    let path = url.split(['?', '#']).next()?;
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}
