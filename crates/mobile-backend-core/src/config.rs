//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::AuthProvider;

/// Default remote backend endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://ahall-samples-push-on-insert.azurewebsites.net";

/// Default local cache file name.
pub const DEFAULT_LOCAL_CACHE: &str = "localtaskstore.db";

/// Fixed configuration a session is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of the remote backend.
    pub endpoint: String,
    /// Local cache identifier.
    pub local_cache: String,
    /// Identity provider used by `authenticate`.
    pub provider: AuthProvider,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            local_cache: DEFAULT_LOCAL_CACHE.to_string(),
            provider: AuthProvider::MicrosoftAccount,
        }
    }
}

impl SessionConfig {
    /// Override the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the local cache identifier.
    #[must_use]
    pub fn with_local_cache(mut self, local_cache: impl Into<String>) -> Self {
        self.local_cache = local_cache.into();
        self
    }

    /// Override the identity provider.
    #[must_use]
    pub fn with_provider(mut self, provider: AuthProvider) -> Self {
        self.provider = provider;
        self
    }
}
