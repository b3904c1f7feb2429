//! Auth API.

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::types::{
    AuthResponse, ChangePasswordRequest, LoginCredentials, RefreshRequest, RegisterData,
    ResetPasswordRequest, TokenResponse, User, UserResponse,
};

/// Auth API client.
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and persist the returned tokens.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .client
            .post("/api/auth/login", credentials)
            .await
            .map_err(|e| e.or_fallback("Login failed"))?;

        self.persist_tokens(&response);
        Ok(response)
    }

    /// Register a new account and persist the returned tokens.
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .client
            .post("/api/auth/register", data)
            .await
            .map_err(|e| e.or_fallback("Registration failed"))?;

        self.persist_tokens(&response);
        Ok(response)
    }

    fn persist_tokens(&self, response: &AuthResponse) {
        let tokens = self.client.tokens();
        tokens.set_token(&response.token);
        if let Some(refresh) = &response.refresh_token {
            tokens.set_refresh_token(refresh);
        }
    }

    /// Log out.
    ///
    /// The remote call is best-effort: its failure is logged and ignored so
    /// that local session teardown always completes.
    pub async fn logout(&self) {
        if let Err(e) = self.client.post_empty_unit("/api/auth/logout").await {
            tracing::warn!(error = %e, "Logout API call failed, clearing local session anyway");
        }
        self.client.tokens().clear();
    }

    /// Fetch the user for the current credential.
    pub async fn current_user(&self) -> Result<User> {
        let response: UserResponse = self
            .client
            .get("/api/auth/me")
            .await
            .map_err(|e| e.or_fallback("Failed to get current user"))?;
        Ok(response.user)
    }

    /// Exchange the stored refresh token for a new bearer token.
    ///
    /// On any failure the stored credentials are cleared; a half-refreshed
    /// session is worse than none.
    pub async fn refresh_token(&self) -> Result<String> {
        match self.try_refresh().await {
            Ok(token) => Ok(token),
            Err(e) => {
                self.client.tokens().clear();
                Err(e.or_fallback("Token refresh failed"))
            }
        }
    }

    async fn try_refresh(&self) -> Result<String> {
        let refresh = self
            .client
            .tokens()
            .refresh_token()
            .ok_or_else(|| Error::Config("No refresh token available".to_string()))?;

        let response: TokenResponse = self
            .client
            .post(
                "/api/auth/refresh",
                &RefreshRequest {
                    refresh_token: refresh,
                },
            )
            .await?;

        self.client.tokens().set_token(&response.token);
        Ok(response.token)
    }

    /// Change the current user's password.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        self.client
            .post_unit(
                "/api/auth/change-password",
                &ChangePasswordRequest {
                    current_password: current_password.to_string(),
                    new_password: new_password.to_string(),
                },
            )
            .await
            .map_err(|e| e.or_fallback("Password change failed"))
    }

    /// Request a password-reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.client
            .post_unit(
                "/api/auth/forgot-password",
                &serde_json::json!({ "email": email }),
            )
            .await
            .map_err(|e| e.or_fallback("Failed to send reset email"))
    }

    /// Complete a password reset using an emailed token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        self.client
            .post_unit(
                "/api/auth/reset-password",
                &ResetPasswordRequest {
                    token: token.to_string(),
                    new_password: new_password.to_string(),
                },
            )
            .await
            .map_err(|e| e.or_fallback("Password reset failed"))
    }
}
