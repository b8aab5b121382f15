//! Collaborator traits for the remote backend and the local cache.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::{AuthProvider, Record, SyncContext, TableDefinition, UserIdentity};

/// Local store error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Table already defined: {0}")]
    DuplicateTable(String),
    #[error("Invalid table definition for '{table}': {reason}")]
    InvalidTable { table: String, reason: String },
    #[error("Local store already initialized")]
    AlreadyInitialized,
    #[error("Local store unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Sync context error.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Sync context already initialized")]
    AlreadyInitialized,
    #[error("Local store initialization failed: {0}")]
    Store(#[from] StoreError),
}

/// A request the backend refused, as reported by the remote client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOperation {
    /// HTTP status code of the response.
    pub status: u16,
    /// Human-readable message extracted from the response.
    pub message: String,
    /// URI of the refused request.
    pub request_uri: String,
    /// Reason phrase of the response status.
    pub reason_phrase: String,
}

impl fmt::Display for InvalidOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} ({})",
            self.status, self.reason_phrase, self.message, self.request_uri
        )
    }
}

/// Remote client error.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("Invalid operation: {0}")]
    InvalidOperation(Box<InvalidOperation>),
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Short name of the error kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint { .. } => "invalid_endpoint",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::Transport(_) => "transport",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<InvalidOperation> for RemoteError {
    fn from(op: InvalidOperation) -> Self {
        Self::InvalidOperation(Box::new(op))
    }
}

/// Trait for local cache stores.
///
/// Tables are defined first, then the store is initialized once by the
/// sync context it is bound to.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Store identifier (file name for file-backed stores).
    fn name(&self) -> &str;

    /// Register a table shape. Fails once the store is initialized.
    fn define_table(&self, table: TableDefinition) -> Result<(), StoreError>;

    /// Snapshot of the registered tables.
    fn tables(&self) -> Vec<TableDefinition>;

    /// Materialize the registered tables.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// True once `initialize` has succeeded.
    fn is_initialized(&self) -> bool;
}

/// Typed helpers over [`LocalStore`].
pub trait LocalStoreExt: LocalStore {
    /// Register the table for record type `T`.
    ///
    /// # Errors
    /// Returns error if the table is invalid, already defined, or the store
    /// is already initialized.
    fn define_record<T: Record>(&self) -> Result<(), StoreError> {
        self.define_table(T::table())
    }
}

impl<S: LocalStore + ?Sized> LocalStoreExt for S {}

/// Trait for remote backend clients.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Base endpoint the client talks to.
    fn endpoint(&self) -> &str;

    /// Synchronization context binding this client to a local store.
    fn sync_context(&self) -> &SyncContext;

    /// Log in through the given identity provider.
    async fn login(&self, provider: AuthProvider) -> Result<UserIdentity, RemoteError>;
}

/// Factory for the two collaborators a session is built from.
pub trait Backend: Send + Sync {
    /// Build a remote client for `endpoint`.
    ///
    /// # Errors
    /// Returns error if the endpoint is unusable.
    fn remote_client(&self, endpoint: &str) -> Result<Arc<dyn RemoteClient>, RemoteError>;

    /// Build a local store named `name`.
    ///
    /// # Errors
    /// Returns error if the store cannot be created.
    fn local_store(&self, name: &str) -> Result<Arc<dyn LocalStore>, StoreError>;
}
