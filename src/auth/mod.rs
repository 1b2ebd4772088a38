//! Authentication module
//!
//! Provides authentication headers for provider API access.

pub mod provider;
pub mod token;

pub use provider::{AuthHeader, AuthProvider, BoxedAuthProvider};
pub use token::{TokenProvider, TokenScheme};

use crate::config::ProviderConfig;
use crate::error::AuthError;

/// Create an auth provider from configuration
pub fn create_auth_provider(config: &ProviderConfig) -> Result<BoxedAuthProvider, AuthError> {
    let token = config.token.clone().ok_or(AuthError::NotConfigured)?;
    let scheme = TokenScheme::for_provider(config.kind, config.user.as_deref());
    Ok(Box::new(TokenProvider::new(token, scheme)?))
}
