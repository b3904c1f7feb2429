//! Data handles binding the resource services to the query cache.
//!
//! These carry the consistency contract between the client cache and the
//! remote store: reads go through [`QueryClient`] with per-key staleness
//! windows, and writes never patch cached payloads — a successful mutation
//! invalidates the affected key so the next read re-fetches.

use std::time::Duration;

use protrack_cache::{QueryClient, QueryError, QueryOptions};

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::types::{
    AuthResponse, CreateProtocolData, DocumentUpload, DuplicateCheck, LoginCredentials, Protocol,
    RegisterData, UpdateProtocolData, User,
};

/// Query key for the session user.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Query key for the protocols list.
pub const PROTOCOLS_KEY: &str = "protocols";

/// Staleness window for the session user.
const CURRENT_USER_STALE: Duration = Duration::from_secs(5 * 60);

/// Staleness window for the protocols list.
const PROTOCOLS_STALE: Duration = Duration::from_secs(2 * 60);

/// Session and authentication operations over the cache.
#[derive(Clone)]
pub struct AuthHandle {
    client: ApiClient,
    cache: QueryClient,
}

impl AuthHandle {
    pub fn new(client: ApiClient, cache: QueryClient) -> Self {
        Self { client, cache }
    }

    /// The current session user.
    ///
    /// Gated on credential presence: while no token is stored the query is
    /// disabled and the fetcher never runs, so an unauthenticated call can
    /// never trip the transport's 401 redirect. Retry is off — an invalid
    /// session should fail fast.
    pub async fn current_user(&self) -> std::result::Result<User, QueryError<Error>> {
        let options = QueryOptions::new()
            .with_stale_time(CURRENT_USER_STALE)
            .with_enabled(self.client.tokens().token().is_some())
            .without_retry();

        let client = self.client.clone();
        self.cache
            .fetch_query(CURRENT_USER_KEY, options, move || {
                let auth = client.auth();
                async move { auth.current_user().await }
            })
            .await
    }

    /// Whether a credential is stored and a session user is known.
    pub async fn is_authenticated(&self) -> bool {
        self.client.tokens().token().is_some()
            && self
                .cache
                .get_query_data::<User>(CURRENT_USER_KEY)
                .await
                .is_some()
    }

    /// Log in, seed the session-user cache entry, and navigate home.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let response = self.client.auth().login(credentials).await?;
        self.cache
            .set_query_data(CURRENT_USER_KEY, response.user.clone())
            .await;
        self.client.navigator().navigate("/");
        Ok(response)
    }

    /// Register, seed the session-user cache entry, and navigate home.
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
        let response = self.client.auth().register(data).await?;
        self.cache
            .set_query_data(CURRENT_USER_KEY, response.user.clone())
            .await;
        self.client.navigator().navigate("/");
        Ok(response)
    }

    /// Log out: tear down the session locally no matter what the remote
    /// call does, drop every cached query, and navigate to the login view.
    pub async fn logout(&self) {
        self.client.auth().logout().await;
        self.cache.clear().await;
        self.client.navigator().navigate("/login");
    }

    /// Change the current user's password.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        self.client
            .auth()
            .change_password(current_password, new_password)
            .await
    }

    /// Request a password-reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.client.auth().forgot_password(email).await
    }

    /// Complete a password reset.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        self.client.auth().reset_password(token, new_password).await
    }

    /// The last error message recorded for the session-user query.
    pub async fn last_user_error(&self) -> Option<String> {
        self.cache.last_error(CURRENT_USER_KEY).await
    }
}

/// Protocol list and mutation operations over the cache.
#[derive(Clone)]
pub struct ProtocolsHandle {
    client: ApiClient,
    cache: QueryClient,
}

impl ProtocolsHandle {
    pub fn new(client: ApiClient, cache: QueryClient) -> Self {
        Self { client, cache }
    }

    /// The protocols list, cached for two minutes.
    pub async fn protocols(&self) -> std::result::Result<Vec<Protocol>, QueryError<Error>> {
        let options = QueryOptions::new().with_stale_time(PROTOCOLS_STALE);
        let client = self.client.clone();
        self.cache
            .fetch_query(PROTOCOLS_KEY, options, move || {
                let api = client.protocols();
                async move { api.list().await }
            })
            .await
    }

    /// Create a protocol record and invalidate the cached list.
    pub async fn create(&self, data: &CreateProtocolData) -> Result<Protocol> {
        let protocol = self.client.protocols().create(data).await?;
        self.cache.invalidate(PROTOCOLS_KEY).await;
        Ok(protocol)
    }

    /// Update a protocol record and invalidate the cached list.
    pub async fn update(&self, id: &str, data: &UpdateProtocolData) -> Result<Protocol> {
        let protocol = self.client.protocols().update(id, data).await?;
        self.cache.invalidate(PROTOCOLS_KEY).await;
        Ok(protocol)
    }

    /// Delete a protocol record and invalidate the cached list.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.protocols().delete(id).await?;
        self.cache.invalidate(PROTOCOLS_KEY).await;
        Ok(())
    }

    /// Record a verification outcome and invalidate the cached list.
    pub async fn verify(&self, id: &str) -> Result<Protocol> {
        let protocol = self.client.protocols().verify(id).await?;
        self.cache.invalidate(PROTOCOLS_KEY).await;
        Ok(protocol)
    }

    /// Check an external protocol identifier for duplicates.
    ///
    /// Read-only against the remote store; no cache effect.
    pub async fn check_duplicate(&self, protocol_id: &str) -> Result<DuplicateCheck> {
        self.client.protocols().check_duplicate(protocol_id).await
    }

    /// Upload a protocol document and invalidate the cached list.
    pub async fn upload_document(
        &self,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentUpload> {
        let upload = self
            .client
            .protocols()
            .upload_document(id, file_name, bytes)
            .await?;
        self.cache.invalidate(PROTOCOLS_KEY).await;
        Ok(upload)
    }

    /// The last error message recorded for the protocols query.
    pub async fn last_protocols_error(&self) -> Option<String> {
        self.cache.last_error(PROTOCOLS_KEY).await
    }
}
