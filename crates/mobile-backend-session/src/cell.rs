//! Process-scoped, initialize-once session accessor.

use mobile_backend_core::{Backend, SessionConfig};
use tokio::sync::OnceCell;

use crate::session::{Session, SessionError};

/// Lazily opens exactly one [`Session`] and hands it out on every call.
///
/// Create one at the application entry point and share it (e.g. behind an
/// `Arc`) with whatever needs session access.
pub struct SessionCell<B>
where
    B: Backend,
{
    config: SessionConfig,
    backend: B,
    session: OnceCell<Session>,
}

impl<B> SessionCell<B>
where
    B: Backend,
{
    /// Create an empty cell; nothing is built until [`SessionCell::get`].
    #[must_use]
    pub fn new(config: SessionConfig, backend: B) -> Self {
        Self {
            config,
            backend,
            session: OnceCell::new(),
        }
    }

    /// Get the session, opening it on first access.
    ///
    /// Concurrent first callers wait on a single initialization and all
    /// observe the same session. If initialization fails the error is
    /// returned and the next call starts over.
    ///
    /// # Errors
    /// Returns [`SessionError::Initialization`] if the session cannot be
    /// opened.
    pub async fn get(&self) -> Result<&Session, SessionError> {
        self.session
            .get_or_try_init(|| async {
                Session::open(&self.backend, self.config.clone())
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Session initialization failed");
                        SessionError::from(e)
                    })
            })
            .await
    }

    /// The session if it has already been opened.
    #[must_use]
    pub fn try_get(&self) -> Option<&Session> {
        self.session.get()
    }

    /// True once a session has been opened successfully.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.session.initialized()
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}
