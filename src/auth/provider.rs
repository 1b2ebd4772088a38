//! Authentication provider trait
//!
//! Each Git-hosting provider expects its token in a different header shape.
//! The API client only ever asks an [`AuthProvider`] for the header to attach.

use crate::error::AuthError;
// async_trait required for dyn-compatibility with Box<dyn AuthProvider>
use async_trait::async_trait;
use base64::Engine;

/// Authentication provider trait
///
/// Implementations provide authentication credentials for provider API requests.
/// Async so that short-lived credentials (GitHub App installation tokens) can
/// be minted on demand by a future implementation.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Get the authentication header for the next request
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError>;

    /// Get a description of the auth method (for logging)
    fn auth_type(&self) -> &'static str;
}

/// Authentication header to use with requests
#[derive(Debug, Clone)]
pub enum AuthHeader {
    /// `Authorization: Bearer <token>` (GitHub, Bitbucket access tokens)
    Bearer(String),
    /// `Authorization: token <token>` (Gitea)
    Token(String),
    /// `PRIVATE-TOKEN: <token>` (GitLab)
    PrivateToken(String),
    /// `Authorization: Basic <user:password>` (Bitbucket app passwords)
    Basic { user: String, password: String },
}

impl AuthHeader {
    /// Get the header name for this auth type
    pub fn header_name(&self) -> &'static str {
        match self {
            AuthHeader::PrivateToken(_) => "PRIVATE-TOKEN",
            _ => "Authorization",
        }
    }

    /// Get the header value for this auth type
    pub fn header_value(&self) -> String {
        match self {
            AuthHeader::Bearer(token) => format!("Bearer {}", token),
            AuthHeader::Token(token) => format!("token {}", token),
            AuthHeader::PrivateToken(token) => token.clone(),
            AuthHeader::Basic { user, password } => {
                let raw = format!("{}:{}", user, password);
                format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode(raw)
                )
            }
        }
    }
}

/// Box type alias for auth providers
pub type BoxedAuthProvider = Box<dyn AuthProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_shapes() {
        let bearer = AuthHeader::Bearer("abc".into());
        assert_eq!(bearer.header_name(), "Authorization");
        assert_eq!(bearer.header_value(), "Bearer abc");

        let token = AuthHeader::Token("abc".into());
        assert_eq!(token.header_name(), "Authorization");
        assert_eq!(token.header_value(), "token abc");

        let private = AuthHeader::PrivateToken("abc".into());
        assert_eq!(private.header_name(), "PRIVATE-TOKEN");
        assert_eq!(private.header_value(), "abc");
    }

    #[test]
    fn test_basic_header_is_base64() {
        let basic = AuthHeader::Basic {
            user: "bot".into(),
            password: "app-pass".into(),
        };
        assert_eq!(basic.header_name(), "Authorization");
        // base64("bot:app-pass")
        assert_eq!(basic.header_value(), "Basic Ym90OmFwcC1wYXNz");
    }
}
