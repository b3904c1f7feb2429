//! Query identification and per-query options.

use std::time::Duration;

/// Default staleness window: data is considered stale immediately.
pub const DEFAULT_STALE_TIME: Duration = Duration::ZERO;

/// Default retry policy for read operations.
pub const DEFAULT_RETRY: RetryPolicy = RetryPolicy::Limited(3);

/// Stable identifier of "what data" a cache entry holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QueryKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for QueryKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Retry policy for a query's fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Fail on the first error. Used for mutations and for queries where
    /// failing fast is the contract (the current-user query).
    None,
    /// Retry up to this many times after the initial failure.
    Limited(u32),
}

impl RetryPolicy {
    /// Total number of fetch attempts this policy permits.
    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryPolicy::None => 1,
            RetryPolicy::Limited(retries) => 1 + retries,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        DEFAULT_RETRY
    }
}

/// Options controlling a single query.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// How long after a successful fetch the cached value stays fresh.
    pub stale_time: Duration,

    /// Gate: a disabled query never executes its fetcher.
    pub enabled: bool,

    /// Retry policy applied when the fetcher fails.
    pub retry: RetryPolicy,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            enabled: true,
            retry: DEFAULT_RETRY,
        }
    }
}

impl QueryOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the staleness window.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// Enable or disable the query.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Disable retries entirely.
    pub fn without_retry(mut self) -> Self {
        self.retry = RetryPolicy::None;
        self
    }
}
