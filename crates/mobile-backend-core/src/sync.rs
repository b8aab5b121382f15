//! Synchronization context binding a local store to a remote client.

use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;

use crate::traits::{LocalStore, SyncError};

/// Binding between one local store and its remote client.
///
/// The store is initialized and bound at most once; after that the binding
/// is read-only.
#[derive(Default)]
pub struct SyncContext {
    store: OnceLock<Arc<dyn LocalStore>>,
    init_lock: Mutex<()>,
}

impl SyncContext {
    /// Create an unbound sync context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize `store` and bind it to this context.
    ///
    /// # Errors
    /// Returns error if a store is already bound or the store fails to
    /// initialize. A failed attempt leaves the context unbound.
    pub async fn initialize(&self, store: Arc<dyn LocalStore>) -> Result<(), SyncError> {
        let _guard = self.init_lock.lock().await;
        if self.store.get().is_some() {
            return Err(SyncError::AlreadyInitialized);
        }

        tracing::debug!(store = store.name(), "Initializing local store");
        store.initialize().await?;

        // Cannot fail: the init lock is held and the cell was empty.
        let _ = self.store.set(store);
        tracing::debug!("Sync context bound");
        Ok(())
    }

    /// True once a store is bound.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.store.get().is_some()
    }

    /// The bound store, if any.
    #[must_use]
    pub fn store(&self) -> Option<&Arc<dyn LocalStore>> {
        self.store.get()
    }
}
