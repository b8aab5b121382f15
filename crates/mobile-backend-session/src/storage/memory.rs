//! In-memory local store.

use std::sync::{
    RwLock,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use mobile_backend_core::{LocalStore, StoreError, TableDefinition};

use super::register_table;

/// In-memory local store.
///
/// Useful for development and tests.
/// Nothing is persisted across restarts.
pub struct MemoryStore {
    name: String,
    tables: RwLock<Vec<TableDefinition>>,
    initialized: AtomicBool,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: RwLock::new(Vec::new()),
            initialized: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn define_table(&self, table: TableDefinition) -> Result<(), StoreError> {
        // Held across the flag check so a racing initialize sees the table.
        let mut tables = self
            .tables
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        if self.initialized.load(Ordering::SeqCst) {
            return Err(StoreError::AlreadyInitialized);
        }
        register_table(&mut tables, table)
    }

    fn tables(&self) -> Vec<TableDefinition> {
        self.tables
            .read()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        let count = {
            let tables = self
                .tables
                .read()
                .map_err(|e| StoreError::Internal(e.to_string()))?;
            if self.initialized.swap(true, Ordering::SeqCst) {
                return Err(StoreError::AlreadyInitialized);
            }
            tables.len()
        };

        tracing::debug!(store = %self.name, tables = count, "Memory store initialized");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}
