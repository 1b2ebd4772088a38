//! OWNERS and OWNERS_ALIASES policy files
//!
//! ```yaml
//! approvers:
//!   - alice
//!   - release-team   # expanded through OWNERS_ALIASES
//! ```
//!
//! ```yaml
//! aliases:
//!   release-team:
//!     - bob
//!     - carol
//! ```

use crate::error::PolicyFormatError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};

pub const OWNERS_FILE: &str = "OWNERS";
pub const OWNERS_ALIASES_FILE: &str = "OWNERS_ALIASES";

#[derive(Debug, Default, Deserialize)]
struct RawOwners {
    #[serde(default)]
    approvers: Option<Vec<serde_yaml::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAliases {
    #[serde(default)]
    aliases: Option<HashMap<String, Option<Vec<serde_yaml::Value>>>>,
}

/// Parsed OWNERS file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnersFile {
    pub approvers: BTreeSet<String>,
}

impl OwnersFile {
    /// Parse raw OWNERS content
    ///
    /// A blank file, a missing `approvers` key and an empty `approvers:` all
    /// give an empty set. Unknown keys are ignored.
    pub fn parse(content: &[u8]) -> Result<Self, PolicyFormatError> {
        let raw: RawOwners = parse_document(OWNERS_FILE, content)?;
        Ok(Self {
            approvers: logins(OWNERS_FILE, raw.approvers.unwrap_or_default())?,
        })
    }

    /// Literal membership, case-sensitive
    pub fn is_approver(&self, login: &str) -> bool {
        self.approvers.contains(login)
    }

    /// Membership after expanding approver entries that name an alias
    pub fn is_approver_with(&self, login: &str, aliases: &OwnersAliases) -> bool {
        self.is_approver(login)
            || self
                .approvers
                .iter()
                .any(|entry| aliases.members(entry).is_some_and(|m| m.contains(login)))
    }
}

/// Parsed OWNERS_ALIASES file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnersAliases {
    aliases: HashMap<String, BTreeSet<String>>,
}

impl OwnersAliases {
    pub fn parse(content: &[u8]) -> Result<Self, PolicyFormatError> {
        let raw: RawAliases = parse_document(OWNERS_ALIASES_FILE, content)?;
        let aliases = raw
            .aliases
            .unwrap_or_default()
            .into_iter()
            .map(|(name, members)| {
                logins(OWNERS_ALIASES_FILE, members.unwrap_or_default()).map(|m| (name, m))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { aliases })
    }

    pub fn members(&self, alias: &str) -> Option<&BTreeSet<String>> {
        self.aliases.get(alias)
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Decode a YAML mapping document; blank content is an empty document
fn parse_document<T>(file: &str, content: &[u8]) -> Result<T, PolicyFormatError>
where
    T: DeserializeOwned + Default,
{
    let text = std::str::from_utf8(content)
        .map_err(|e| PolicyFormatError::new(file, format!("not valid UTF-8: {}", e)))?;

    if text.trim().is_empty() {
        return Ok(T::default());
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| PolicyFormatError::new(file, e.to_string()))?;

    match value {
        // A document of only comments
        serde_yaml::Value::Null => Ok(T::default()),
        serde_yaml::Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|e| PolicyFormatError::new(file, e.to_string()))
        }
        _ => Err(PolicyFormatError::new(file, "top level is not a mapping")),
    }
}

/// Collect login entries from a YAML list
///
/// Numbers and booleans keep their text form (`- 12345` is the login
/// `"12345"`), nulls and blanks are skipped. Nested lists or mappings are
/// malformed.
fn logins(
    file: &str,
    entries: Vec<serde_yaml::Value>,
) -> Result<BTreeSet<String>, PolicyFormatError> {
    let mut set = BTreeSet::new();
    for entry in entries {
        let login = match entry {
            serde_yaml::Value::Null => continue,
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            other => {
                return Err(PolicyFormatError::new(
                    file,
                    format!("expected a login, found {:?}", other),
                ));
            }
        };
        let login = login.trim();
        if !login.is_empty() {
            set.insert(login.to_string());
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_approvers() {
        let owners = OwnersFile::parse(b"approvers:\n  - alice\n  - bob\n").unwrap();
        assert!(owners.is_approver("alice"));
        assert!(owners.is_approver("bob"));
        assert!(!owners.is_approver("carol"));
        assert_eq!(owners.approvers.len(), 2);
    }

    #[rstest]
    #[case::numeric(b"approvers:\n  - 12345\n  - alice\n" as &[u8], &["12345", "alice"])]
    #[case::boolean(b"approvers:\n  - true\n", &["true"])]
    #[case::null_skipped(b"approvers:\n  - null\n  - alice\n  -\n", &["alice"])]
    #[case::quoted(b"approvers:\n  - \"007\"\n", &["007"])]
    fn test_parse_scalar_approvers(#[case] content: &[u8], #[case] expected: &[&str]) {
        let owners = OwnersFile::parse(content).unwrap();
        let expected: BTreeSet<String> = expected.iter().map(|l| l.to_string()).collect();
        assert_eq!(owners.approvers, expected);
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let owners = OwnersFile::parse(b"approvers:\n  - Alice\n").unwrap();
        assert!(owners.is_approver("Alice"));
        assert!(!owners.is_approver("alice"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let content = b"reviewers:\n  - dave\napprovers:\n  - alice\noptions:\n  no_parent_owners: true\n";
        let owners = OwnersFile::parse(content).unwrap();
        assert_eq!(owners.approvers, BTreeSet::from(["alice".to_string()]));
    }

    #[rstest]
    #[case::blank(b"" as &[u8])]
    #[case::whitespace(b"  \n\n")]
    #[case::comment_only(b"# nobody yet\n")]
    #[case::no_approvers_key(b"reviewers:\n  - dave\n")]
    #[case::empty_approvers(b"approvers:\n")]
    #[case::empty_list(b"approvers: []\n")]
    fn test_empty_policies(#[case] content: &[u8]) {
        let owners = OwnersFile::parse(content).unwrap();
        assert!(owners.approvers.is_empty());
    }

    #[rstest]
    #[case::bad_indentation(b"approvers:\n  - alice\n - bob\n" as &[u8])]
    #[case::scalar_document(b"just some text\n")]
    #[case::list_document(b"- alice\n- bob\n")]
    #[case::approvers_not_a_list(b"approvers: alice\n")]
    #[case::not_utf8(b"approvers:\n  - \xff\xfe\n")]
    #[case::nested_list(b"approvers:\n  - [alice, bob]\n")]
    #[case::mapping_entry(b"approvers:\n  - name: alice\n")]
    fn test_malformed_policies(#[case] content: &[u8]) {
        let err = OwnersFile::parse(content).unwrap_err();
        assert_eq!(err.file, OWNERS_FILE);
    }

    #[test]
    fn test_alias_expansion() {
        let owners = OwnersFile::parse(b"approvers:\n  - alice\n  - release-team\n").unwrap();
        let aliases =
            OwnersAliases::parse(b"aliases:\n  release-team:\n    - bob\n    - carol\n").unwrap();

        assert!(owners.is_approver_with("alice", &aliases));
        assert!(owners.is_approver_with("carol", &aliases));
        assert!(!owners.is_approver("carol"));
        assert!(!owners.is_approver_with("release-team-member", &aliases));
    }

    #[test]
    fn test_alias_not_referenced_by_owners() {
        let owners = OwnersFile::parse(b"approvers:\n  - alice\n").unwrap();
        let aliases = OwnersAliases::parse(b"aliases:\n  ops:\n    - bob\n").unwrap();
        assert!(!owners.is_approver_with("bob", &aliases));
    }

    #[test]
    fn test_aliases_blank_and_malformed() {
        assert!(OwnersAliases::parse(b"").unwrap().is_empty());
        assert!(OwnersAliases::parse(b"aliases:\n  ops:\n").unwrap().members("ops").is_some());

        let err = OwnersAliases::parse(b"aliases:\n  - ops\n").unwrap_err();
        assert_eq!(err.file, OWNERS_ALIASES_FILE);

        let err = OwnersAliases::parse(b"aliases:\n  ops:\n    - {name: bob}\n").unwrap_err();
        assert_eq!(err.file, OWNERS_ALIASES_FILE);
    }

    #[test]
    fn test_alias_members_accept_numeric_logins() {
        let owners = OwnersFile::parse(b"approvers:\n  - ops\n").unwrap();
        let aliases = OwnersAliases::parse(b"aliases:\n  ops:\n    - 4242\n    - null\n").unwrap();
        assert!(owners.is_approver_with("4242", &aliases));
        assert_eq!(aliases.members("ops").map(|m| m.len()), Some(1));
    }
}
