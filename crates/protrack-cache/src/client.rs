//! The query cache itself.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::error::QueryError;
use crate::options::{QueryKey, QueryOptions};

/// State held for one query key.
#[derive(Default)]
struct Entry {
    /// Last successfully fetched (or seeded) value, type-erased.
    data: Option<Arc<dyn Any + Send + Sync>>,

    /// When the value was last fetched. `None` means stale: either never
    /// fetched or invalidated since.
    fetched_at: Option<Instant>,

    /// Display form of the most recent fetch failure.
    last_error: Option<String>,

    /// Incremented on every successful fetch or seed. Lets a caller that
    /// waited on the fetch lock detect that another caller completed a
    /// fetch in the meantime, independent of the staleness window.
    generation: u64,

    /// Serializes fetches for this key.
    fetch_lock: Arc<Mutex<()>>,
}

impl Entry {
    /// The cached value if it is still within the staleness window.
    fn fresh_value<T>(&self, options: &QueryOptions) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let fetched_at = self.fetched_at?;
        if fetched_at.elapsed() > options.stale_time {
            return None;
        }
        self.value()
    }

    /// The cached value regardless of freshness.
    fn value<T>(&self) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.data
            .as_ref()
            .and_then(|d| d.clone().downcast::<T>().ok())
            .map(|arc| (*arc).clone())
    }
}

/// Async read-through cache keyed by [`QueryKey`].
///
/// Cloning is cheap and clones share state. All transitions happen under
/// one lock and values are handed out as clones, so readers observe
/// either the previous value or the new one, never a torn state.
#[derive(Clone, Default)]
pub struct QueryClient {
    inner: Arc<RwLock<HashMap<QueryKey, Entry>>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a query, fetching if the cached value is absent or stale.
    ///
    /// - A disabled query returns [`QueryError::Disabled`] without
    ///   invoking the fetcher.
    /// - A fresh cached value is returned without fetching.
    /// - Otherwise the fetcher runs under the key's fetch lock; callers
    ///   arriving while a fetch is in flight wait for it and share its
    ///   result instead of fetching again. Sharing does not depend on the
    ///   staleness window: a result produced while the caller waited is
    ///   returned even at a zero stale time.
    /// - Fetch failures are retried per `options.retry`; the final error
    ///   is recorded as the key's last error and propagated.
    pub async fn fetch_query<T, E, F, Fut>(
        &self,
        key: impl Into<QueryKey>,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<T, QueryError<E>>
    where
        T: Clone + Send + Sync + 'static,
        E: std::fmt::Display + std::fmt::Debug,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = key.into();

        if !options.enabled {
            trace!(key = %key, "Query disabled, skipping fetch");
            return Err(QueryError::Disabled);
        }

        // Fast path: fresh cached value.
        {
            let state = self.inner.read().await;
            if let Some(value) = state.get(&key).and_then(|e| e.fresh_value::<T>(&options)) {
                trace!(key = %key, "Query cache hit");
                return Ok(value);
            }
        }

        // Serialize fetches for this key, noting the generation observed
        // before waiting.
        let (fetch_lock, observed_generation) = {
            let mut state = self.inner.write().await;
            let entry = state.entry(key.clone()).or_default();
            (entry.fetch_lock.clone(), entry.generation)
        };
        let _guard = fetch_lock.lock().await;

        // Re-check: a concurrent caller may have completed the fetch while
        // we waited for the lock. A generation bump means a fetch finished
        // after this caller arrived; its result is shared even when the
        // staleness window has already closed on it.
        {
            let state = self.inner.read().await;
            if let Some(entry) = state.get(&key) {
                if entry.generation != observed_generation {
                    if let Some(value) = entry.value::<T>() {
                        trace!(key = %key, "Sharing result of completed in-flight fetch");
                        return Ok(value);
                    }
                }
                if let Some(value) = entry.fresh_value::<T>(&options) {
                    trace!(key = %key, "Query became fresh while waiting");
                    return Ok(value);
                }
            }
        }

        debug!(key = %key, "Query stale or missing, fetching");

        let max_attempts = options.retry.max_attempts();
        let mut attempt = 1;
        let error = loop {
            match fetcher().await {
                Ok(value) => {
                    let mut state = self.inner.write().await;
                    let entry = state.entry(key.clone()).or_default();
                    entry.data = Some(Arc::new(value.clone()));
                    entry.fetched_at = Some(Instant::now());
                    entry.last_error = None;
                    entry.generation = entry.generation.wrapping_add(1);
                    return Ok(value);
                }
                Err(e) if attempt < max_attempts => {
                    debug!(key = %key, attempt, error = %e, "Query fetch failed, retrying");
                    attempt += 1;
                }
                Err(e) => break e,
            }
        };

        let mut state = self.inner.write().await;
        state.entry(key.clone()).or_default().last_error = Some(error.to_string());
        Err(QueryError::Fetch(error))
    }

    /// The cached value for a key, fresh or stale.
    pub async fn get_query_data<T>(&self, key: impl Into<QueryKey>) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let state = self.inner.read().await;
        state.get(&key.into()).and_then(|e| e.value())
    }

    /// Seed a key with a known value, marking it freshly fetched.
    pub async fn set_query_data<T>(&self, key: impl Into<QueryKey>, value: T)
    where
        T: Clone + Send + Sync + 'static,
    {
        let key = key.into();
        let mut state = self.inner.write().await;
        let entry = state.entry(key).or_default();
        entry.data = Some(Arc::new(value));
        entry.fetched_at = Some(Instant::now());
        entry.last_error = None;
        entry.generation = entry.generation.wrapping_add(1);
    }

    /// Mark a key stale. The cached value stays readable via
    /// [`get_query_data`](Self::get_query_data), but the next
    /// [`fetch_query`](Self::fetch_query) must re-fetch.
    pub async fn invalidate(&self, key: impl Into<QueryKey>) {
        let key = key.into();
        let mut state = self.inner.write().await;
        if let Some(entry) = state.get_mut(&key) {
            entry.fetched_at = None;
            debug!(key = %key, "Query invalidated");
        }
    }

    /// Remove a key entirely.
    pub async fn remove(&self, key: impl Into<QueryKey>) {
        let mut state = self.inner.write().await;
        state.remove(&key.into());
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        let mut state = self.inner.write().await;
        state.clear();
        debug!("Query cache cleared");
    }

    /// The most recent fetch failure message for a key.
    pub async fn last_error(&self, key: impl Into<QueryKey>) -> Option<String> {
        let state = self.inner.read().await;
        state.get(&key.into()).and_then(|e| e.last_error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RetryPolicy;
    use std::fmt;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug)]
    struct FetchFailed(&'static str);

    impl fmt::Display for FetchFailed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    #[tokio::test]
    async fn test_fresh_value_skips_fetch() {
        let cache = QueryClient::new();
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let options = QueryOptions::new().with_stale_time(Duration::from_secs(60));

        for _ in 0..3 {
            let value: Result<Vec<u32>, QueryError<FetchFailed>> = cache
                .fetch_query("protocols", options, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_stale_time_refetches_every_read() {
        let cache = QueryClient::new();
        let calls = AtomicU32::new(0);
        let calls = &calls;

        for _ in 0..2 {
            let _: Result<u32, QueryError<FetchFailed>> = cache
                .fetch_query("counter", QueryOptions::new(), move || async move {
                    Ok(calls.fetch_add(1, Ordering::SeqCst))
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_query_never_fetches() {
        let cache = QueryClient::new();
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let options = QueryOptions::new().with_enabled(false);

        let result: Result<u32, QueryError<FetchFailed>> = cache
            .fetch_query("currentUser", options, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(0)
            })
            .await;

        assert!(matches!(result, Err(QueryError::Disabled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch_but_keeps_data() {
        let cache = QueryClient::new();
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let options = QueryOptions::new().with_stale_time(Duration::from_secs(60));

        let _: Result<u32, QueryError<FetchFailed>> = cache
            .fetch_query("protocols", options, move || async move {
                Ok(calls.fetch_add(1, Ordering::SeqCst))
            })
            .await;

        cache.invalidate("protocols").await;

        // Stale data is still readable without fetching.
        assert_eq!(cache.get_query_data::<u32>("protocols").await, Some(0));

        let second: Result<u32, QueryError<FetchFailed>> = cache
            .fetch_query("protocols", options, move || async move {
                Ok(calls.fetch_add(1, Ordering::SeqCst))
            })
            .await;

        assert_eq!(second.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_single_fetch() {
        let cache = QueryClient::new();
        let calls = Arc::new(AtomicU32::new(0));
        let options = QueryOptions::new().with_stale_time(Duration::from_secs(60));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                let value: Result<u32, QueryError<FetchFailed>> = cache
                    .fetch_query("protocols", options, || {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok(42)
                        }
                    })
                    .await;
                value.unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_inflight_fetch_at_zero_stale_time() {
        // Deduplication of in-flight fetches must not depend on the
        // staleness window: even with the default (zero) stale time,
        // readers that arrive while a fetch is running share its result.
        let cache = QueryClient::new();
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                let value: Result<u32, QueryError<FetchFailed>> = cache
                    .fetch_query("protocols", QueryOptions::new(), || {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok(42)
                        }
                    })
                    .await;
                value.unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_policy_attempt_counts() {
        let cache = QueryClient::new();

        // Limited(3): fails twice, succeeds on the third attempt.
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let options = QueryOptions::new().with_retry(RetryPolicy::Limited(3));
        let result: Result<u32, QueryError<FetchFailed>> = cache
            .fetch_query("flaky", options, move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(FetchFailed("boom"))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // None: a single failure is final.
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let options = QueryOptions::new().without_retry();
        let result: Result<u32, QueryError<FetchFailed>> = cache
            .fetch_query("fail-fast", options, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(FetchFailed("boom"))
            })
            .await;
        assert!(matches!(result, Err(QueryError::Fetch(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_last_error_recorded_and_cleared() {
        let cache = QueryClient::new();

        let result: Result<u32, QueryError<FetchFailed>> = cache
            .fetch_query("protocols", QueryOptions::new().without_retry(), || async {
                Err::<u32, _>(FetchFailed("Failed to fetch protocols"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(
            cache.last_error("protocols").await,
            Some("Failed to fetch protocols".to_string())
        );

        let result: Result<u32, QueryError<FetchFailed>> = cache
            .fetch_query("protocols", QueryOptions::new(), || async { Ok(1) })
            .await;
        assert!(result.is_ok());
        assert_eq!(cache.last_error("protocols").await, None);
    }

    #[tokio::test]
    async fn test_set_query_data_seeds_fresh_value() {
        let cache = QueryClient::new();
        cache.set_query_data("currentUser", "alice".to_string()).await;

        let calls = AtomicU32::new(0);
        let calls = &calls;
        let options = QueryOptions::new().with_stale_time(Duration::from_secs(60));
        let value: Result<String, QueryError<FetchFailed>> = cache
            .fetch_query("currentUser", options, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("bob".to_string())
            })
            .await;

        assert_eq!(value.unwrap(), "alice");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = QueryClient::new();
        cache.set_query_data("a", 1u32).await;
        cache.set_query_data("b", 2u32).await;

        cache.clear().await;

        assert_eq!(cache.get_query_data::<u32>("a").await, None);
        assert_eq!(cache.get_query_data::<u32>("b").await, None);
    }
}
