//! Error types for trigger-gate
//!
//! This module defines the error hierarchy used throughout the application.
//! Policy outcomes (not a collaborator, no OWNERS file, payload shape mismatch)
//! are never errors; they surface as a denied decision. Only I/O faults,
//! malformed policy files and cancellation reach the caller as `Err`.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider API error: {0}")]
    Provider(#[from] ProviderError),

    #[error("ACL evaluation error: {0}")]
    Acl(#[from] AclError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

/// Errors raised by a Git-hosting provider call
///
/// `NotFound` is the only variant that carries policy meaning: the engine
/// turns it into "no such file" when fetching OWNERS. Every other variant is a
/// transport fault and is surfaced unchanged.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized: invalid or expired token")]
    Unauthorized,

    #[error("Forbidden: insufficient permissions for {action}")]
    Forbidden { action: String },

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Request timeout after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl ProviderError {
    /// Create an appropriate error from an HTTP status code and response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            401 => ProviderError::Unauthorized,
            403 => ProviderError::Forbidden {
                action: "this operation".into(),
            },
            404 => ProviderError::NotFound {
                resource: "requested resource".into(),
            },
            429 => ProviderError::RateLimited { retry_after: 60 },
            _ => ProviderError::Api {
                status,
                message: if body.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.to_string()
                },
            },
        }
    }

    /// Attach the resource that was missing to a `NotFound` error
    pub fn with_resource(self, resource: impl Into<String>) -> Self {
        match self {
            ProviderError::NotFound { .. } => ProviderError::NotFound {
                resource: resource.into(),
            },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

/// An OWNERS or OWNERS_ALIASES file that exists but cannot be parsed
///
/// A malformed policy file is an operator mistake, not evidence that no
/// policy exists, so it is surfaced instead of being treated as absent.
#[derive(Error, Debug)]
#[error("Malformed policy file '{file}': {reason}")]
pub struct PolicyFormatError {
    pub file: String,
    pub reason: String,
}

impl PolicyFormatError {
    pub fn new(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced by the ACL engine
#[derive(Error, Debug)]
pub enum AclError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Policy(#[from] PolicyFormatError),

    #[error("Decision cancelled before completion")]
    Cancelled,
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authentication configured")]
    NotConfigured,

    #[error("Invalid token format")]
    InvalidToken,
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for provider API operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Result type alias for ACL evaluation
pub type AclResult<T> = std::result::Result<T, AclError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_from_response() {
        assert!(matches!(
            ProviderError::from_response(401, ""),
            ProviderError::Unauthorized
        ));

        assert!(matches!(
            ProviderError::from_response(403, ""),
            ProviderError::Forbidden { .. }
        ));

        assert!(matches!(
            ProviderError::from_response(404, ""),
            ProviderError::NotFound { .. }
        ));

        assert!(matches!(
            ProviderError::from_response(429, ""),
            ProviderError::RateLimited { .. }
        ));

        let api_err = ProviderError::from_response(500, "Internal server error");
        assert!(matches!(api_err, ProviderError::Api { status: 500, .. }));

        let empty = ProviderError::from_response(502, "");
        assert_eq!(empty.to_string(), "Provider API error (HTTP 502): HTTP 502");
    }

    #[test]
    fn test_with_resource_only_touches_not_found() {
        let err = ProviderError::from_response(404, "").with_resource("OWNERS@main");
        match err {
            ProviderError::NotFound { resource } => assert_eq!(resource, "OWNERS@main"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ProviderError::Unauthorized.with_resource("OWNERS@main");
        assert!(matches!(err, ProviderError::Unauthorized));
    }

    #[test]
    fn test_acl_error_is_transparent_over_provider() {
        let err: AclError = ProviderError::Unauthorized.into();
        assert_eq!(err.to_string(), "Unauthorized: invalid or expired token");

        let err: AclError = PolicyFormatError::new("OWNERS", "bad indent").into();
        assert!(err.to_string().contains("OWNERS"));
    }
}
