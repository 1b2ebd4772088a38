//! Secret string type for provider tokens.

use serde::Deserialize;
use std::fmt;

/// A wrapper for secrets that prevents accidental logging.
///
/// `Debug` and `Display` print `[REDACTED]`; the value is only reachable
/// through [`SecretString::expose_secret`]. The whole [`AppConfig`] is
/// `Debug`, so the provider token must never be a plain `String`.
///
/// [`AppConfig`]: crate::config::AppConfig
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Explicitly expose the secret value.
    ///
    /// Only call this when building an authentication header.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Best-effort clearing; copies made by reqwest header values are not covered.
        self.0.clear();
        self.0.shrink_to_fit();
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redacted() {
        let secret = SecretString::new("ghp_secret");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
    }

    #[test]
    fn test_expose_secret() {
        let secret = SecretString::new("ghp_secret");
        assert_eq!(secret.expose_secret(), "ghp_secret");
        assert_eq!(secret.clone().expose_secret(), "ghp_secret");
    }

    #[test]
    fn test_config_debug_does_not_leak_token() {
        let config = crate::config::ProviderConfig {
            token: Some(SecretString::new("ghp_secret")),
            ..Default::default()
        };
        let output = format!("{:?}", config);
        assert!(!output.contains("ghp_secret"));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn test_deserialize() {
        let secret: SecretString = serde_json::from_str(r#""glpat-token""#).unwrap();
        assert_eq!(secret.expose_secret(), "glpat-token");
    }
}
