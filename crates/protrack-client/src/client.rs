//! The shared transport client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use url::Url;

use protrack_auth::TokenStore;

use crate::api::{AuthApi, ProtocolsApi};
use crate::error::{Error, ErrorResponse, Result};
use crate::navigate::{Navigator, NoopNavigator};

/// Environment variable supplying the API base address.
pub const BASE_URL_ENV: &str = "PROTRACK_API_URL";

/// Base address used when neither the builder nor the environment supply one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Fixed upper bound on request duration.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// protrack API client.
///
/// A single shared HTTP client with two interceptor-like behaviors:
/// every outbound request attaches the current bearer token when one is
/// stored, and every 401 response clears the credential and forces
/// navigation to the login view before the error propagates to the caller.
///
/// # Example
///
/// ```no_run
/// use protrack_client::ApiClient;
///
/// # async fn example() -> protrack_client::Result<()> {
/// let client = ApiClient::builder()
///     .base_url("http://localhost:5000")
///     .build()?;
///
/// let protocols = client.protocols().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Request timeout.
    timeout: Duration,
    /// Credential store read before every request.
    tokens: TokenStore,
    /// Receiver for forced navigation on authentication failure.
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a new client builder.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Create a client from environment configuration with default settings.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The token store this client reads and clears.
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// The injected navigation receiver.
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the protocols API.
    pub fn protocols(&self) -> ProtocolsApi {
        ProtocolsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(Error::from)
    }

    /// Start a request, attaching the bearer token when one is stored.
    ///
    /// A missing token never blocks the request; the call simply goes out
    /// unauthenticated.
    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut req = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);
        if let Some(token) = self.inner.tokens.token() {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self.request(Method::GET, url).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request with a JSON body.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request with no body.
    pub(crate) async fn post_empty<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self.request(Method::POST, url).send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request where only the status matters.
    pub(crate) async fn post_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self.request(Method::POST, url).json(body).send().await?;
        self.check_status(response).await
    }

    /// Make a POST request with no body where only the status matters.
    pub(crate) async fn post_empty_unit(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let response = self.request(Method::POST, url).send().await?;
        self.check_status(response).await
    }

    /// Make a multipart POST request with a single named file part.
    pub(crate) async fn post_multipart<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<T> {
        let url = self.url(path)?;
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(field.to_string(), part);
        let response = self
            .request(Method::POST, url)
            .multipart(form)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self.request(Method::PUT, url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let response = self.request(Method::DELETE, url).send().await?;
        self.check_status(response).await
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Check the status of a response whose body is irrelevant.
    async fn check_status(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response, running the global
    /// authentication-failure recovery for 401s.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|e| e.message);

        match status {
            401 => {
                self.handle_unauthorized();
                Error::Auth { message }
            }
            404 => Error::NotFound { message },
            _ => Error::Api { status, message },
        }
    }

    /// Side-channel recovery for authentication failure: clear the stored
    /// credential and force the application to the login view. The caller's
    /// own error still propagates afterward.
    fn handle_unauthorized(&self) {
        tracing::warn!("Received 401, clearing credentials");
        self.inner.tokens.clear();

        let navigator = &self.inner.navigator;
        if !navigator.current_path().contains("/login") {
            navigator.navigate("/login");
        }
    }
}

/// Builder for creating an [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    tokens: Option<TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            tokens: None,
            navigator: Arc::new(NoopNavigator),
        }
    }

    /// Set the base URL, overriding the environment.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the token store. Defaults to an in-memory store.
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the navigation receiver for authentication-failure recovery.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Build the client.
    ///
    /// The base URL is resolved as: builder argument, then the
    /// `PROTRACK_API_URL` environment variable, then `http://localhost:5000`.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                tokens: self.tokens.unwrap_or_else(TokenStore::in_memory),
                navigator: self.navigator,
            }),
        })
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_with_base_url() {
        let client = ApiClient::builder()
            .base_url("http://localhost:5000")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ApiClient::builder()
            .base_url("http://localhost:5000/")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_url_building() {
        let client = ApiClient::builder()
            .base_url("http://localhost:5000")
            .build()
            .unwrap();

        let url = client.url("/api/protocols").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/protocols");

        let url = client.url("api/protocols").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/protocols");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = ApiClient::builder().base_url("not a url").build();
        assert!(result.is_err());
    }
}
