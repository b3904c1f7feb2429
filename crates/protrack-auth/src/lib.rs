//! Credential persistence and route guarding for the protrack client.
//!
//! This crate owns the two pieces of session state that exist outside the
//! HTTP layer:
//!
//! - [`TokenStore`]: the bearer credential, persisted in a primary storage
//!   backend and mirrored into a cookie jar so the route guard (which has
//!   no access to the primary store) can observe it.
//! - [`guard`]: the pure allow/redirect decision evaluated before a page
//!   is served.
//!
//! # Example
//!
//! ```rust
//! use protrack_auth::{TokenStore, guard, GuardDecision};
//!
//! let store = TokenStore::in_memory();
//! store.set_token("secret");
//!
//! let has_cookie = store.cookies().get(protrack_auth::AUTH_COOKIE).is_some();
//! assert_eq!(guard::evaluate("/protocols", has_cookie), GuardDecision::Allow);
//!
//! store.clear();
//! assert!(store.token().is_none());
//! ```

mod cookie;
pub mod guard;
mod storage;
mod token;

pub use cookie::{Cookie, CookieJar, SameSite};
pub use guard::GuardDecision;
pub use storage::{FileStorage, MemoryStorage, NullStorage, StorageBackend};
pub use token::{AUTH_COOKIE, REFRESH_TOKEN_KEY, TOKEN_KEY, TokenStore};
