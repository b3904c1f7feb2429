//! Token store: dual-location persistence of the bearer credential.

use std::sync::Arc;

use crate::cookie::{Cookie, CookieJar};
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "auth-token";

/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh-token";

/// Name of the cookie mirroring the bearer token for the route guard.
pub const AUTH_COOKIE: &str = "auth-token";

/// Persists the bearer credential in a primary storage backend and mirrors
/// it into a cookie jar.
///
/// Invariant: any operation that writes or clears one location writes or
/// clears the other. The refresh token lives in the primary store only;
/// the guard never needs it.
///
/// All operations are best-effort and idempotent. When the backend reports
/// no available medium, writes are no-ops and reads return `None`.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn StorageBackend>,
    cookies: CookieJar,
}

impl TokenStore {
    /// Create a token store over an arbitrary backend.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            cookies: CookieJar::new(),
        }
    }

    /// In-memory store, primarily for tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// File-backed store persisting to the given path.
    pub fn from_file(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::open(path)))
    }

    /// The cookie jar holding the guard-visible mirror.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Store the bearer token in both locations.
    pub fn set_token(&self, token: &str) {
        if !self.storage.is_available() {
            return;
        }
        self.storage.set(TOKEN_KEY, token);
        self.cookies.set(Cookie::auth(AUTH_COOKIE, token));
        tracing::debug!("Bearer token stored");
    }

    /// The current bearer token, read from the primary location.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// Store the refresh token (primary location only).
    pub fn set_refresh_token(&self, token: &str) {
        if !self.storage.is_available() {
            return;
        }
        self.storage.set(REFRESH_TOKEN_KEY, token);
    }

    /// The current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    /// Remove both tokens and expire the cookie mirror immediately.
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(REFRESH_TOKEN_KEY);
        self.cookies.expire(AUTH_COOKIE);
        tracing::debug!("Credentials cleared");
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}
