//! Bound session: remote client + local cache + authenticated user.

use std::{fmt, sync::Arc};

use mobile_backend_core::{
    AuthProvider, Backend, LocalStore, LocalStoreExt, RemoteClient, SessionConfig, TodoItem,
    UserIdentity,
    traits::{RemoteError, StoreError, SyncError},
};
use tokio::sync::OnceCell;

/// Failure while building and binding a session.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Remote client error: {0}")]
    Remote(#[from] RemoteError),
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),
    #[error("Sync context error: {0}")]
    Sync(#[from] SyncError),
}

/// Session error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session initialization failed: {0}")]
    Initialization(#[from] InitError),
    #[error("Login denied by {provider} (status {status}): {message}")]
    LoginDenied {
        provider: AuthProvider,
        status: u16,
        message: String,
    },
    #[error("Login failed: {0}")]
    Login(#[source] RemoteError),
}

/// A remote client bound to its local cache.
///
/// Only [`Session::open`] creates one, so a `Session` value always has both
/// handles set and bound together.
pub struct Session {
    config: SessionConfig,
    remote: Arc<dyn RemoteClient>,
    store: Arc<dyn LocalStore>,
    user: OnceCell<UserIdentity>,
}

impl Session {
    /// Build both collaborators, register the record tables, and bind the
    /// local store into the remote client's sync context.
    ///
    /// # Errors
    /// Returns the first failure from any step; nothing is retained.
    pub async fn open<B>(backend: &B, config: SessionConfig) -> Result<Self, InitError>
    where
        B: Backend + ?Sized,
    {
        tracing::info!(
            endpoint = %config.endpoint,
            local_cache = %config.local_cache,
            "Initializing session"
        );

        let remote = backend.remote_client(&config.endpoint)?;
        let store = backend.local_store(&config.local_cache)?;

        store.define_record::<TodoItem>()?;
        remote.sync_context().initialize(Arc::clone(&store)).await?;

        tracing::info!(endpoint = remote.endpoint(), "Session initialized");

        Ok(Self {
            config,
            remote,
            store,
            user: OnceCell::new(),
        })
    }

    /// Log in with the configured identity provider.
    ///
    /// Once a login has succeeded this returns the stored identity without
    /// contacting the backend. Concurrent callers share a single login call.
    ///
    /// # Errors
    /// Returns [`SessionError::LoginDenied`] if the backend refuses the
    /// login, or [`SessionError::Login`] for any other remote failure.
    pub async fn authenticate(&self) -> Result<&UserIdentity, SessionError> {
        self.user.get_or_try_init(|| self.login()).await
    }

    async fn login(&self) -> Result<UserIdentity, SessionError> {
        let provider = self.config.provider;
        tracing::debug!(%provider, "Logging in");

        match self.remote.login(provider).await {
            Ok(user) => {
                tracing::info!(user_id = %user.user_id, %provider, "Authenticated");
                Ok(user)
            }
            Err(RemoteError::InvalidOperation(op)) => {
                tracing::warn!(
                    error_kind = "invalid_operation",
                    status = op.status,
                    message = %op.message,
                    request_uri = %op.request_uri,
                    reason_phrase = %op.reason_phrase,
                    %provider,
                    "Login denied"
                );
                Err(SessionError::LoginDenied {
                    provider,
                    status: op.status,
                    message: op.message,
                })
            }
            Err(e) => {
                tracing::error!(error_kind = e.kind(), error = %e, %provider, "Login failed");
                Err(SessionError::Login(e))
            }
        }
    }

    /// True once the local store is initialized and bound.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized() && self.remote.sync_context().is_initialized()
    }

    /// True iff a user identity is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.initialized()
    }

    /// The authenticated user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<&UserIdentity> {
        self.user.get()
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Remote backend client.
    #[must_use]
    pub fn remote(&self) -> &Arc<dyn RemoteClient> {
        &self.remote
    }

    /// Local cache store.
    #[must_use]
    pub fn local_store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.config.endpoint)
            .field("local_cache", &self.store.name())
            .field("initialized", &self.is_initialized())
            .field("user", &self.user.get())
            .finish_non_exhaustive()
    }
}
