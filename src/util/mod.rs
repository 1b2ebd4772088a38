//! Utility functions shared across the application.

mod secret;

pub use secret::SecretString;

use std::fmt::Display;

/// Builder for URL query parameters.
///
/// Values are URL-encoded as they are added.
///
/// # Example
/// ```ignore
/// let query = QueryBuilder::new()
///     .param("page", 1)
///     .non_empty("ref", "main")
///     .non_empty("sha", "")
///     .build();
/// // Returns "?page=1&ref=main"
/// ```
#[derive(Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter (always included).
    pub fn param(mut self, key: &str, value: impl Display) -> Self {
        self.params.push((
            key.to_string(),
            urlencoding::encode(&value.to_string()).into_owned(),
        ));
        self
    }

    /// Add a parameter only when the value is non-empty.
    pub fn non_empty(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.param(key, value)
        }
    }

    /// Build the query string.
    ///
    /// Returns an empty string if no parameters were added,
    /// otherwise returns "?key1=value1&key2=value2...".
    pub fn build(self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .into_iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// URL-encode a single path segment (owner, repository, login, file path).
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
