//! Remote client over HTTP.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use mobile_backend_core::{
    AuthProvider, InvalidOperation, RemoteClient, RemoteError, SyncContext, UserIdentity,
};
use reqwest::Url;

use crate::{
    identity::IdentityProvider,
    protocol::{self, API_VERSION, API_VERSION_HEADER, LoginRequest, LoginResponse},
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote backend client speaking the App Service HTTP API.
pub struct HttpRemoteClient {
    endpoint: String,
    base: Url,
    http: reqwest::Client,
    sync: SyncContext,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl HttpRemoteClient {
    /// Create a client for `endpoint`.
    ///
    /// No request is made; an unreachable backend only shows up on the
    /// first call that needs it.
    ///
    /// # Errors
    /// Returns [`RemoteError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute http(s) URL.
    pub fn new(endpoint: &str) -> Result<Self, RemoteError> {
        let invalid = |reason: String| RemoteError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let mut base = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(invalid("missing host".into()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Client build failed: {e}")))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            base,
            http,
            sync: SyncContext::new(),
            identity: None,
        })
    }

    /// Attach the identity provider used by [`RemoteClient::login`].
    #[must_use]
    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// URL of the login route for `provider`.
    ///
    /// # Errors
    /// Returns error if the URL cannot be built from the base endpoint.
    pub fn login_url(&self, provider: AuthProvider) -> Result<Url, RemoteError> {
        self.base
            .join(&format!(".auth/login/{}", provider.login_path()))
            .map_err(|e| RemoteError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Debug for HttpRemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRemoteClient")
            .field("endpoint", &self.endpoint)
            .field("bound", &self.sync.is_initialized())
            .field("identity", &self.identity.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn sync_context(&self) -> &SyncContext {
        &self.sync
    }

    async fn login(&self, provider: AuthProvider) -> Result<UserIdentity, RemoteError> {
        let identity = self.identity.as_ref().ok_or_else(|| {
            RemoteError::ProviderUnavailable(format!("no identity provider configured for {provider}"))
        })?;
        let access_token = identity.access_token(provider).await?;

        let url = self.login_url(provider)?;
        tracing::debug!(%url, %provider, "Sending login request");

        let response = self
            .http
            .post(url.clone())
            .header(API_VERSION_HEADER, API_VERSION)
            .json(&LoginRequest {
                access_token: access_token.expose(),
            })
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        tracing::debug!(%status, "Login response");

        if !status.is_success() {
            let reason_phrase = status.canonical_reason().unwrap_or_default().to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(InvalidOperation {
                status: status.as_u16(),
                message: protocol::error_message(&body).unwrap_or_else(|| reason_phrase.clone()),
                request_uri: url.to_string(),
                reason_phrase,
            }
            .into());
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        Ok(body.into())
    }
}
