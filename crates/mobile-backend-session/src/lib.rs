//! Session coordination and local cache stores.
//!
//! Provides:
//! - `SessionCell` - process-scoped, initialize-once accessor
//! - `Session` - bound remote client + local cache with idempotent login
//! - Storage implementations (memory, SQLite)

pub mod cell;
pub mod session;
pub mod storage;

#[cfg(all(test, feature = "memory"))]
mod mock;

pub use cell::SessionCell;
pub use session::{InitError, Session, SessionError};
