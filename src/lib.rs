//! trigger-gate
//!
//! Access control for CI triggers coming from Git-hosting providers.
//!
//! ## Features
//!
//! - **One decision engine** for GitHub, Gitea, GitLab and Bitbucket Cloud
//! - **Trust sources**: organization owner, collaborators with write access,
//!   OWNERS approvers (with OWNERS_ALIASES), and `/ok-to-test` comments from
//!   any of those
//! - **Decision API** over HTTP, or a one-shot `check` command
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Trust Model
//!
//! ```text
//! sender == organization → collaborator → OWNERS approver
//! ok-to-test-comment: every /ok-to-test author goes through the same chain
//! ```
//!
//! ## Example Configuration
//!
//! ```toml
//! [provider]
//! kind = "gitea"
//! url = "https://gitea.example.com"
//! # token from TRIGGER_GATE_TOKEN env var
//!
//! [acl]
//! remember_ok_to_test = true
//! ```

pub mod acl;
pub mod auth;
pub mod config;
pub mod error;
pub mod event;
pub mod provider;
pub mod server;
pub mod util;

// Re-export main types
pub use acl::{AclDecision, AclEngine, TrustSource};
pub use config::{AppConfig, load_config};
pub use error::{AclError, AppError, Result};
pub use event::Event;
pub use provider::{Provider, SharedProvider, create_provider};
