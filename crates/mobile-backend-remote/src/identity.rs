//! Sources of identity-provider access tokens.

use async_trait::async_trait;
use mobile_backend_core::{AuthProvider, AuthToken, RemoteError};

/// Trait for obtaining an access token from an identity provider.
///
/// Implement this to integrate a provider's own sign-in UI or SDK; the
/// remote client exchanges the token for a backend session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Acquire an access token for `provider`.
    async fn access_token(&self, provider: AuthProvider) -> Result<AuthToken, RemoteError>;
}

/// Identity provider that always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    token: AuthToken,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AuthToken::new(token),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn access_token(&self, _provider: AuthProvider) -> Result<AuthToken, RemoteError> {
        Ok(self.token.clone())
    }
}
