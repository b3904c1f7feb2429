//! Client error types.

use thiserror::Error;

/// Client error type.
///
/// Server-shaped variants carry the server-supplied message when one was
/// present in the response body; resource services fill the gaps with a
/// fixed per-operation message via [`Error::or_fallback`].
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a fallback message was applied.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-2xx response.
    #[error("{}", .message.as_deref().unwrap_or("request failed"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the server, if it sent one.
        message: Option<String>,
    },

    /// Authentication failed (401).
    #[error("{}", .message.as_deref().unwrap_or("authentication required"))]
    Auth {
        /// Message from the server, if it sent one.
        message: Option<String>,
    },

    /// Resource not found (404).
    #[error("{}", .message.as_deref().unwrap_or("not found"))]
    NotFound {
        /// Message from the server, if it sent one.
        message: Option<String>,
    },

    /// The request exceeded the transport timeout.
    #[error("{0}")]
    Timeout(String),

    /// The request failed at the network level.
    #[error("{0}")]
    Network(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Apply a per-operation fallback message.
    ///
    /// A server-supplied message is never overwritten. Transport failures
    /// (network errors, timeouts) are converted into [`Error::Timeout`] /
    /// [`Error::Network`] carrying the operation message, matching the
    /// "server message or generic per-operation message" contract.
    pub fn or_fallback(self, fallback: &str) -> Self {
        match self {
            Error::Api {
                status,
                message: None,
            } => Error::Api {
                status,
                message: Some(fallback.to_string()),
            },
            Error::Auth { message: None } => Error::Auth {
                message: Some(fallback.to_string()),
            },
            Error::NotFound { message: None } => Error::NotFound {
                message: Some(fallback.to_string()),
            },
            Error::Http(e) if e.is_timeout() => Error::Timeout(fallback.to_string()),
            Error::Http(_) | Error::Json(_) => Error::Network(fallback.to_string()),
            other => other,
        }
    }

    /// The user-facing message, if one has been established.
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::Api { message, .. }
            | Error::Auth { message }
            | Error::NotFound { message } => message.as_deref(),
            Error::Timeout(m) | Error::Network(m) => Some(m),
            _ => None,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth { .. }) || matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. }) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body shape the server uses for failed requests.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_fills_missing_message() {
        let err = Error::Api {
            status: 500,
            message: None,
        }
        .or_fallback("Login failed");

        assert_eq!(err.message(), Some("Login failed"));
        assert_eq!(err.to_string(), "Login failed");
    }

    #[test]
    fn test_fallback_preserves_server_message() {
        let err = Error::Auth {
            message: Some("Invalid credentials".to_string()),
        }
        .or_fallback("Login failed");

        assert_eq!(err.message(), Some("Invalid credentials"));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_fallback_leaves_config_untouched() {
        let err = Error::Config("base_url is required".to_string()).or_fallback("Login failed");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_auth_predicate() {
        assert!(
            Error::Auth { message: None }.is_auth_error()
        );
        assert!(
            Error::Api {
                status: 401,
                message: None
            }
            .is_auth_error()
        );
        assert!(
            !Error::Api {
                status: 500,
                message: None
            }
            .is_auth_error()
        );
    }
}
