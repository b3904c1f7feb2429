//! Error type for query operations.

/// Error returned by [`QueryClient::fetch_query`](crate::QueryClient::fetch_query).
///
/// Generic over the fetcher's error type so callers keep their typed
/// errors; the cache additionally records the display form as the key's
/// last error message.
#[derive(Debug, thiserror::Error)]
pub enum QueryError<E>
where
    E: std::fmt::Display + std::fmt::Debug,
{
    /// The query is disabled; the fetcher was not invoked.
    #[error("query is disabled")]
    Disabled,

    /// The fetcher failed (after exhausting the retry policy).
    #[error("{0}")]
    Fetch(E),
}

impl<E> QueryError<E>
where
    E: std::fmt::Display + std::fmt::Debug,
{
    /// The underlying fetch error, if this is a fetch failure.
    pub fn into_fetch_error(self) -> Option<E> {
        match self {
            QueryError::Fetch(e) => Some(e),
            QueryError::Disabled => None,
        }
    }
}
