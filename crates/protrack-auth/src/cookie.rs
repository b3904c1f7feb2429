//! A minimal cookie model for the guard-visible credential mirror.
//!
//! The route guard runs at request time and cannot read the primary
//! storage backend, so the token store mirrors the credential into a
//! cookie jar. Only the attributes the guard and the mirror actually use
//! are modeled.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// SameSite cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// A single cookie with the attributes the client sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub same_site: SameSite,
    /// Absolute expiry; `None` means a session cookie.
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Build the auth credential cookie: root path, one-day expiry,
    /// SameSite=Strict.
    pub fn auth(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: "/".to_string(),
            same_site: SameSite::Strict,
            expires: Some(Utc::now() + Duration::seconds(86_400)),
        }
    }

    /// Whether the cookie has passed its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|at| at <= Utc::now())
    }
}

/// In-memory cookie jar with shared interior, so the token store and the
/// route guard observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Arc<RwLock<HashMap<String, Cookie>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cookie, replacing any existing cookie of the same name.
    pub fn set(&self, cookie: Cookie) {
        self.cookies.write().insert(cookie.name.clone(), cookie);
    }

    /// Get the value of a non-expired cookie.
    pub fn get(&self, name: &str) -> Option<String> {
        let cookies = self.cookies.read();
        cookies
            .get(name)
            .filter(|c| !c.is_expired())
            .map(|c| c.value.clone())
    }

    /// Expire a cookie immediately, clearing its value.
    ///
    /// The entry is kept (with an epoch expiry) rather than removed,
    /// matching how a cleared browser cookie is overwritten with an
    /// already-past expiry date.
    pub fn expire(&self, name: &str) {
        let mut cookies = self.cookies.write();
        if let Some(cookie) = cookies.get_mut(name) {
            cookie.value.clear();
            cookie.expires = Some(DateTime::<Utc>::UNIX_EPOCH);
        }
    }

    /// Inspect the raw cookie entry, expired or not.
    pub fn entry(&self, name: &str) -> Option<Cookie> {
        self.cookies.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = Cookie::auth("auth-token", "secret");
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.same_site, SameSite::Strict);
        assert!(!cookie.is_expired());

        let expires = cookie.expires.unwrap();
        let max_age = expires - Utc::now();
        assert!(max_age <= Duration::seconds(86_400));
        assert!(max_age > Duration::seconds(86_000));
    }

    #[test]
    fn test_jar_set_get() {
        let jar = CookieJar::new();
        assert_eq!(jar.get("auth-token"), None);

        jar.set(Cookie::auth("auth-token", "secret"));
        assert_eq!(jar.get("auth-token"), Some("secret".to_string()));
    }

    #[test]
    fn test_expire_makes_cookie_invisible() {
        let jar = CookieJar::new();
        jar.set(Cookie::auth("auth-token", "secret"));
        jar.expire("auth-token");

        assert_eq!(jar.get("auth-token"), None);

        // The entry is still present, just expired and cleared.
        let entry = jar.entry("auth-token").unwrap();
        assert!(entry.is_expired());
        assert!(entry.value.is_empty());
    }

    #[test]
    fn test_jar_clones_share_state() {
        let jar = CookieJar::new();
        let view = jar.clone();

        jar.set(Cookie::auth("auth-token", "secret"));
        assert_eq!(view.get("auth-token"), Some("secret".to_string()));
    }
}
