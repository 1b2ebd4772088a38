//! Configuration types for trigger-gate
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::util::SecretString;
use serde::Deserialize;
use std::fmt;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Git-hosting provider connection settings
    pub provider: ProviderConfig,

    /// Trust evaluation settings
    pub acl: AclConfig,

    /// Decision API settings
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Supported Git-hosting providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    GitHub,
    Gitea,
    GitLab,
    #[serde(alias = "bitbucket-cloud")]
    Bitbucket,
}

impl ProviderKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
            ProviderKind::Gitea => "gitea",
            ProviderKind::GitLab => "gitlab",
            ProviderKind::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Which provider API to speak
    pub kind: ProviderKind,

    /// Provider web URL (e.g., `https://github.com`, `https://gitea.example.com`)
    pub url: String,

    /// Explicit API base URL, bypassing the per-provider derivation
    pub api_url: Option<String>,

    /// API token (prefer env var TRIGGER_GATE_TOKEN)
    pub token: Option<SecretString>,

    /// Username paired with the token for Bitbucket app passwords
    pub user: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries for failed requests
    pub max_retries: u32,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::GitHub,
            url: "https://github.com".to_string(),
            api_url: None,
            token: None,
            user: None,
            timeout_secs: 30,
            max_retries: 3,
            verify_ssl: true,
        }
    }
}

impl ProviderConfig {
    /// Get the full API base URL
    pub fn api_url(&self) -> String {
        if let Some(api_url) = &self.api_url {
            return api_url.trim_end_matches('/').to_string();
        }

        let base = self.url.trim_end_matches('/');
        match self.kind {
            ProviderKind::GitHub if is_host(base, "github.com") => {
                "https://api.github.com".to_string()
            }
            ProviderKind::GitHub => format!("{}/api/v3", base),
            ProviderKind::Gitea => format!("{}/api/v1", base),
            ProviderKind::GitLab => format!("{}/api/v4", base),
            ProviderKind::Bitbucket if is_host(base, "bitbucket.org") => {
                "https://api.bitbucket.org/2.0".to_string()
            }
            ProviderKind::Bitbucket => format!("{}/2.0", base),
        }
    }
}

fn is_host(url: &str, host: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    rest == host || rest == format!("www.{}", host)
}

/// Trust evaluation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Scan pull request comments for `/ok-to-test` on default-target events
    /// when the sender is not trusted on their own
    pub remember_ok_to_test: bool,

    /// Expand OWNERS approvers through an OWNERS_ALIASES file
    pub owners_aliases: bool,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            remember_ok_to_test: false,
            owners_aliases: true,
        }
    }
}

/// Decision API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP host
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// Upper bound for a single decision, in seconds
    pub decision_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            decision_timeout_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(kind: ProviderKind, url: &str) -> ProviderConfig {
        ProviderConfig {
            kind,
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_api_url_per_provider() {
        assert_eq!(
            provider(ProviderKind::GitHub, "https://github.com").api_url(),
            "https://api.github.com"
        );
        assert_eq!(
            provider(ProviderKind::GitHub, "https://ghe.example.com/").api_url(),
            "https://ghe.example.com/api/v3"
        );
        assert_eq!(
            provider(ProviderKind::Gitea, "https://gitea.example.com").api_url(),
            "https://gitea.example.com/api/v1"
        );
        assert_eq!(
            provider(ProviderKind::GitLab, "https://gitlab.example.com/").api_url(),
            "https://gitlab.example.com/api/v4"
        );
        assert_eq!(
            provider(ProviderKind::Bitbucket, "https://bitbucket.org").api_url(),
            "https://api.bitbucket.org/2.0"
        );
    }

    #[test]
    fn test_api_url_override_wins() {
        let config = ProviderConfig {
            kind: ProviderKind::GitHub,
            api_url: Some("http://127.0.0.1:9999/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider.kind, ProviderKind::GitHub);
        assert_eq!(config.provider.timeout_secs, 30);
        assert!(!config.acl.remember_ok_to_test);
        assert!(config.acl.owners_aliases);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_provider_kind() {
        let kind: ProviderKind = serde_json::from_str(r#""gitea""#).unwrap();
        assert_eq!(kind, ProviderKind::Gitea);

        let kind: ProviderKind = serde_json::from_str(r#""bitbucket-cloud""#).unwrap();
        assert_eq!(kind, ProviderKind::Bitbucket);

        assert!(serde_json::from_str::<ProviderKind>(r#""svn""#).is_err());
    }
}
