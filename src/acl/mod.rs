//! Access control for CI triggers
//!
//! Decides whether the actor behind an [`Event`](crate::event::Event) is
//! trusted to run pipelines on shared infrastructure. Trust comes from the
//! Git-hosting provider (ownership, collaborator status), from OWNERS files
//! in the repository, or from an `/ok-to-test` comment left by someone who
//! is trusted through one of those.
//!
//! ## OWNERS
//!
//! ```yaml
//! approvers:
//!   - alice
//!   - bob
//! ```
//!
//! Read from the repository's default branch on every decision; nothing is
//! cached between decisions.

pub mod comments;
pub mod engine;
pub mod owners;

pub use comments::{OK_TO_TEST_COMMAND, approving_authors, is_ok_to_test};
pub use engine::{AclDecision, AclEngine, TrustSource};
pub use owners::{OWNERS_ALIASES_FILE, OWNERS_FILE, OwnersAliases, OwnersFile};
