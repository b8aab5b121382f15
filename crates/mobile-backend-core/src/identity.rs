//! Authenticated principals and identity-provider selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity provider requested from the backend's login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// Microsoft consumer account.
    #[default]
    MicrosoftAccount,
    /// Google account.
    Google,
    /// Facebook account.
    Facebook,
    /// Twitter account.
    Twitter,
    /// Azure Active Directory.
    #[serde(alias = "aad")]
    WindowsAzureActiveDirectory,
}

impl AuthProvider {
    /// Path segment used by the backend's `/.auth/login/{provider}` route.
    #[must_use]
    pub const fn login_path(self) -> &'static str {
        match self {
            Self::MicrosoftAccount => "microsoftaccount",
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::WindowsAzureActiveDirectory => "aad",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.login_path())
    }
}

/// Opaque authentication token issued by the backend.
///
/// `Debug` and `Display` never print the token itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for attaching to outgoing requests.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(<redacted, {} bytes>)", self.0.len())
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Principal returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Backend user identifier (e.g. `sid:...`).
    pub user_id: String,
    /// Token to present on authenticated requests.
    pub token: AuthToken,
}

impl UserIdentity {
    /// Create an identity from its parts.
    #[must_use]
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: AuthToken::new(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted() {
        let user = UserIdentity::new("sid:abc", "secret-token");
        let debug = format!("{user:?}");
        assert!(debug.contains("sid:abc"));
        assert!(!debug.contains("secret-token"));
        assert_eq!(user.token.to_string(), "<redacted>");
        assert_eq!(user.token.expose(), "secret-token");
    }

    #[test]
    fn test_provider_login_path() {
        assert_eq!(AuthProvider::default(), AuthProvider::MicrosoftAccount);
        assert_eq!(AuthProvider::MicrosoftAccount.login_path(), "microsoftaccount");
        assert_eq!(
            AuthProvider::WindowsAzureActiveDirectory.to_string(),
            "aad"
        );
    }

    #[test]
    fn test_provider_deserialization() {
        let provider: AuthProvider = serde_json::from_str("\"google\"").unwrap();
        assert_eq!(provider, AuthProvider::Google);

        let provider: AuthProvider = serde_json::from_str("\"aad\"").unwrap();
        assert_eq!(provider, AuthProvider::WindowsAzureActiveDirectory);
    }
}
