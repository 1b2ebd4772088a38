//! Configuration loading tests

use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;
use trigger_gate::config::{LogFormat, ProviderKind, load_config, load_config_from_str};
use trigger_gate::error::ConfigError;

const MINIMAL_CONFIG: &str = r#"
[provider]
kind = "gitea"
url = "https://gitea.example.com"
token = "test-token"
"#;

const FULL_CONFIG: &str = r#"
[provider]
kind = "bitbucket-cloud"
url = "https://bitbucket.org"
token = "app-password"
user = "ci-bot"
timeout_secs = 60
max_retries = 5
verify_ssl = false

[acl]
remember_ok_to_test = true
owners_aliases = false

[server]
host = "0.0.0.0"
port = 9000
decision_timeout_secs = 10

[logging]
level = "debug"
format = "json"
"#;

/// Variables read by `load_config`
const ENV_VARS: &[&str] = &[
    "TRIGGER_GATE__PROVIDER__TOKEN",
    "TRIGGER_GATE__PROVIDER__URL",
    "TRIGGER_GATE__SERVER__PORT",
    "TRIGGER_GATE_TOKEN",
    "GIT_PROVIDER_TOKEN",
];

fn clear_env() {
    for var in ENV_VARS {
        // SAFETY: tests touching the environment run serially
        unsafe { std::env::remove_var(var) };
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: tests touching the environment run serially
    unsafe { std::env::set_var(key, value) };
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_minimal_config() {
    let config = load_config_from_str(MINIMAL_CONFIG).unwrap();

    assert_eq!(config.provider.kind, ProviderKind::Gitea);
    assert_eq!(config.provider.url, "https://gitea.example.com");
    assert_eq!(config.provider.api_url(), "https://gitea.example.com/api/v1");

    // Defaults
    assert!(!config.acl.remember_ok_to_test);
    assert!(config.acl.owners_aliases);
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    // Provider
    assert_eq!(config.provider.kind, ProviderKind::Bitbucket);
    assert_eq!(config.provider.api_url(), "https://api.bitbucket.org/2.0");
    assert_eq!(config.provider.user.as_deref(), Some("ci-bot"));
    assert_eq!(config.provider.timeout_secs, 60);
    assert_eq!(config.provider.max_retries, 5);
    assert!(!config.provider.verify_ssl);

    // ACL
    assert!(config.acl.remember_ok_to_test);
    assert!(!config.acl.owners_aliases);

    // Server
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.decision_timeout_secs, 10);

    // Logging
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_token_is_redacted_in_debug() {
    let config = load_config_from_str(MINIMAL_CONFIG).unwrap();
    let debug = format!("{:?}", config.provider);
    assert!(!debug.contains("test-token"));
}

#[test]
fn test_unknown_provider_kind() {
    let toml = r#"
[provider]
kind = "sourcehut"
"#;
    assert!(matches!(
        load_config_from_str(toml),
        Err(ConfigError::Load(_))
    ));
}

#[test]
#[serial]
fn test_load_config_from_file() {
    clear_env();
    let file = write_config(FULL_CONFIG);

    let config = load_config(file.path().to_str()).unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Bitbucket);
    assert_eq!(
        config.provider.token.as_ref().map(|t| t.expose_secret()),
        Some("app-password")
    );
}

#[test]
#[serial]
fn test_explicit_config_path_must_exist() {
    clear_env();
    let result = load_config(Some("/nonexistent/trigger-gate.toml"));
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = write_config(MINIMAL_CONFIG);
    set_env("TRIGGER_GATE__SERVER__PORT", "9100");
    set_env("TRIGGER_GATE__PROVIDER__URL", "https://git.internal");

    let config = load_config(file.path().to_str());
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.provider.url, "https://git.internal");
}

#[test]
#[serial]
fn test_fallback_token_variable() {
    clear_env();
    let file = write_config("[provider]\nkind = \"github\"\n");
    set_env("GIT_PROVIDER_TOKEN", "from-fallback");

    let config = load_config(file.path().to_str());
    clear_env();

    assert_eq!(
        config.unwrap().provider.token.unwrap().expose_secret(),
        "from-fallback"
    );
}

#[test]
#[serial]
fn test_prefixed_token_wins_over_fallback() {
    clear_env();
    let file = write_config("[provider]\nkind = \"github\"\n");
    set_env("TRIGGER_GATE_TOKEN", "from-fallback");
    set_env("TRIGGER_GATE__PROVIDER__TOKEN", "from-prefixed");

    let config = load_config(file.path().to_str());
    clear_env();

    assert_eq!(
        config.unwrap().provider.token.unwrap().expose_secret(),
        "from-prefixed"
    );
}

#[test]
#[serial]
fn test_missing_token_is_rejected() {
    clear_env();
    let file = write_config("[provider]\nkind = \"gitlab\"\nurl = \"https://gitlab.com\"\n");

    let result = load_config(file.path().to_str());
    assert!(matches!(result, Err(ConfigError::Missing { .. })));
}
