//! Query cache with staleness windows and single-flight fetching.
//!
//! This crate provides the read-through caching layer between resource
//! services and their consumers:
//!
//! - Reads return cached data while it is fresh (within a staleness
//!   window measured from the last successful fetch) and re-fetch
//!   otherwise.
//! - At most one fetch per key is in flight at a time; concurrent readers
//!   share the in-flight result instead of issuing duplicate calls.
//! - Writes never patch cached payloads: a successful mutation calls
//!   [`QueryClient::invalidate`], forcing the next read to re-fetch.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use protrack_cache::{QueryClient, QueryOptions};
//!
//! let cache = QueryClient::new();
//! let options = QueryOptions::new().with_stale_time(Duration::from_secs(120));
//!
//! let protocols = cache
//!     .fetch_query("protocols", options, || service.list())
//!     .await?;
//! ```

mod client;
mod error;
mod options;

pub use client::QueryClient;
pub use error::QueryError;
pub use options::{QueryKey, QueryOptions, RetryPolicy};
