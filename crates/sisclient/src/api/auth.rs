//! Authentication and session state.

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{AccessToken, User};
use crate::storage::TokenStore;
use std::sync::Arc;
use tracing::info;

pub struct AuthApi {
    backend: Arc<Backend>,
    tokens: Arc<TokenStore>,
}

impl AuthApi {
    pub(crate) fn new(backend: Arc<Backend>, tokens: Arc<TokenStore>) -> Self {
        Self { backend, tokens }
    }

    /// Authenticates and persists the session tokens. In mock mode the
    /// authenticated user's id is stored as well so later "current user"
    /// calls resolve to it.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let response = dispatch!(self, login(username, password))?;
        self.tokens
            .set_tokens(&response.tokens.access, &response.tokens.refresh);
        if matches!(self.backend.as_ref(), Backend::Mock(_)) {
            self.tokens.set_mock_user_id(response.user.id);
        }
        info!(user_id = response.user.id, "Logged in");
        Ok(response.user)
    }

    /// Clears all stored session state.
    pub fn logout(&self) {
        self.tokens.clear();
        info!("Logged out");
    }

    /// Exchanges the stored refresh token for a new access token and stores
    /// it.
    pub async fn refresh(&self) -> Result<AccessToken, ApiError> {
        match self.backend.as_ref() {
            Backend::Mock(mock) => {
                let refresh = self
                    .tokens
                    .refresh_token()
                    .ok_or(ApiError::MissingRefreshToken)?;
                let token = mock.refresh_token(&refresh).await?;
                self.tokens.set_access_token(&token.access);
                Ok(token)
            }
            Backend::Http(http) => http.refresh().await,
        }
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        dispatch!(self, current_user())
    }

    /// Whether an access token is currently stored. Says nothing about the
    /// token's validity.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token().is_some()
    }
}
