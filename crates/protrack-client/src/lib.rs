//! Typed HTTP client SDK for the protrack protocol-tracking API.
//!
//! This crate provides the client-side data layer: a shared transport
//! with bearer-credential attachment and global 401 recovery, typed
//! resource services for auth and protocol records, and cache-backed data
//! handles implementing the invalidate-on-mutation consistency contract.
//!
//! # Example
//!
//! ```no_run
//! use protrack_client::{ApiClient, AuthHandle, ProtocolsHandle, LoginCredentials};
//! use protrack_cache::QueryClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::from_env()?;
//! let cache = QueryClient::new();
//!
//! let auth = AuthHandle::new(client.clone(), cache.clone());
//! auth.login(&LoginCredentials {
//!     username: "chen".into(),
//!     password: "secret".into(),
//! })
//! .await?;
//!
//! let protocols = ProtocolsHandle::new(client, cache);
//! for protocol in protocols.protocols().await? {
//!     println!("{} ({:?})", protocol.pi, protocol.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod hooks;
pub mod navigate;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use hooks::{AuthHandle, CURRENT_USER_KEY, PROTOCOLS_KEY, ProtocolsHandle};
pub use navigate::{Navigator, NoopNavigator, RecordingNavigator};
pub use types::*;

// Re-export the cache surface the handles are built on.
pub use protrack_cache::{QueryClient, QueryError, QueryOptions, RetryPolicy};
