//! Static token authentication
//!
//! Personal access tokens, Gitea application tokens, GitLab private tokens
//! and Bitbucket app passwords all reduce to a fixed secret sent with every
//! request; only the header shape differs.

use crate::auth::provider::{AuthHeader, AuthProvider};
use crate::config::ProviderKind;
use crate::error::AuthError;
use crate::util::SecretString;
use async_trait::async_trait;

/// How a static token is presented to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenScheme {
    Bearer,
    Token,
    PrivateToken,
    Basic { user: String },
}

impl TokenScheme {
    /// Pick the scheme each provider expects for a plain token
    pub fn for_provider(kind: ProviderKind, user: Option<&str>) -> Self {
        match (kind, user) {
            (ProviderKind::GitHub, _) => TokenScheme::Bearer,
            (ProviderKind::Gitea, _) => TokenScheme::Token,
            (ProviderKind::GitLab, _) => TokenScheme::PrivateToken,
            (ProviderKind::Bitbucket, Some(user)) if !user.is_empty() => TokenScheme::Basic {
                user: user.to_string(),
            },
            (ProviderKind::Bitbucket, _) => TokenScheme::Bearer,
        }
    }
}

/// Static token authentication provider
#[derive(Debug, Clone)]
pub struct TokenProvider {
    token: SecretString,
    scheme: TokenScheme,
}

impl TokenProvider {
    pub fn new(token: SecretString, scheme: TokenScheme) -> Result<Self, AuthError> {
        if token.expose_secret().trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(Self { token, scheme })
    }
}

#[async_trait]
impl AuthProvider for TokenProvider {
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError> {
        let secret = self.token.expose_secret().to_string();
        Ok(match &self.scheme {
            TokenScheme::Bearer => AuthHeader::Bearer(secret),
            TokenScheme::Token => AuthHeader::Token(secret),
            TokenScheme::PrivateToken => AuthHeader::PrivateToken(secret),
            TokenScheme::Basic { user } => AuthHeader::Basic {
                user: user.clone(),
                password: secret,
            },
        })
    }

    fn auth_type(&self) -> &'static str {
        match self.scheme {
            TokenScheme::Basic { .. } => "App Password",
            _ => "Access Token",
        }
    }
}
