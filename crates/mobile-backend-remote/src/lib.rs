//! HTTP remote client for the mobile backend.
//!
//! Provides:
//! - Login wire protocol (JSON)
//! - `HttpRemoteClient` - remote client over reqwest
//! - `IdentityProvider` - source of provider access tokens
//! - `HttpBackend` - `Backend` pairing the HTTP client with a local store

pub mod backend;
pub mod client;
pub mod identity;
pub mod protocol;

pub use backend::HttpBackend;
pub use client::HttpRemoteClient;
pub use identity::{IdentityProvider, StaticIdentityProvider};
pub use protocol::{LoginRequest, LoginResponse};
