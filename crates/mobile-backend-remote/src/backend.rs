//! `Backend` built on the HTTP remote client.

use std::sync::Arc;

use mobile_backend_core::{Backend, LocalStore, RemoteClient, RemoteError, StoreError};

use crate::{client::HttpRemoteClient, identity::IdentityProvider};

/// Pairs [`HttpRemoteClient`] with local stores from `store_factory`.
pub struct HttpBackend<F> {
    store_factory: F,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl<F> HttpBackend<F>
where
    F: Fn(&str) -> Result<Arc<dyn LocalStore>, StoreError> + Send + Sync,
{
    /// Create a backend that opens local stores with `store_factory`.
    #[must_use]
    pub const fn new(store_factory: F) -> Self {
        Self {
            store_factory,
            identity: None,
        }
    }

    /// Identity provider handed to every remote client built.
    #[must_use]
    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }
}

impl<F> Backend for HttpBackend<F>
where
    F: Fn(&str) -> Result<Arc<dyn LocalStore>, StoreError> + Send + Sync,
{
    fn remote_client(&self, endpoint: &str) -> Result<Arc<dyn RemoteClient>, RemoteError> {
        let mut client = HttpRemoteClient::new(endpoint)?;
        if let Some(identity) = &self.identity {
            client = client.with_identity_provider(Arc::clone(identity));
        }
        Ok(Arc::new(client))
    }

    fn local_store(&self, name: &str) -> Result<Arc<dyn LocalStore>, StoreError> {
        (self.store_factory)(name)
    }
}
