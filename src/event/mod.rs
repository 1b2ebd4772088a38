//! Event model
//!
//! A provider-agnostic view of one inbound trigger. Built once per webhook by
//! the dispatcher, never mutated, dropped once a decision is made.

pub mod payload;

pub use payload::{
    IssueCommentPayload, IssueLink, Payload, PayloadComment, PayloadUser, PullRequestLink,
    PullRequestPayload, PushPayload, RepositoryPayload, issue_number_from_url,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    IssueComment,
    PullRequest,
    Push,
    #[default]
    #[serde(other)]
    Other,
}

impl EventType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventType::IssueComment => "issue_comment",
            EventType::PullRequest => "pull_request",
            EventType::Push => "push",
            EventType::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical trigger category; selects which ACL path applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerTarget {
    #[default]
    Default,
    OkToTestComment,
}

impl TriggerTarget {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TriggerTarget::Default => "default",
            TriggerTarget::OkToTestComment => "ok-to-test-comment",
        }
    }
}

impl fmt::Display for TriggerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized inbound trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Organization, user namespace or workspace owning the repository
    pub organization: String,
    pub repository: String,
    /// Login of the actor who produced the event
    pub sender: String,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default)]
    pub base_branch: String,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub trigger_target: TriggerTarget,
    #[serde(default)]
    pub payload: Payload,
}

impl Event {
    /// `organization/repository`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.organization, self.repository)
    }
}
