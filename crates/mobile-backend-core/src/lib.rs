//! Core abstractions for an offline-capable mobile backend session.
//!
//! This crate provides the building blocks the session coordinator is
//! written against:
//! - `RemoteClient`, `LocalStore` and `Backend` collaborator traits
//! - `SyncContext` - one-time binding of a local store to a remote client
//! - `SessionConfig` - endpoint, cache name and identity provider
//! - Identity and table-schema types

pub mod config;
pub mod identity;
pub mod schema;
pub mod sync;
pub mod traits;

pub use config::SessionConfig;
pub use identity::{AuthProvider, AuthToken, UserIdentity};
pub use schema::{ColumnDefinition, ColumnType, Record, TableDefinition, TodoItem};
pub use sync::SyncContext;
pub use traits::{
    Backend, InvalidOperation, LocalStore, LocalStoreExt, RemoteClient, RemoteError, StoreError,
    SyncError,
};
