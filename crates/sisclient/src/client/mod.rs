//! HTTP client core for the real backend.
//!
//! Single chokepoint for every network call: attaches the bearer token,
//! translates error bodies into [`ApiError`], and recovers from token expiry
//! transparently via the single-flight refresh protocol:
//! 1. A 401 response marks the request as retried and enters the refresh gate.
//! 2. The initiator POSTs the refresh endpoint; concurrent 401s queue behind it.
//! 3. On success every queued request resends once with the new token.
//! 4. On failure every queued request rejects, stored tokens are cleared, and
//!    the forced-logout handler fires.

mod refresh;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::AccessToken;
use crate::storage::TokenStore;
use refresh::{RefreshGate, RefreshRole};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// Callback invoked when an unrecoverable auth failure forces a logout.
/// Stored tokens are already cleared by the time it fires; callers
/// typically navigate to a login screen or drop their session state.
pub type ForcedLogoutHandler = Box<dyn Fn() + Send + Sync>;

pub struct HttpClient {
    http: Client,
    base_url: Url,
    tokens: Arc<TokenStore>,
    refresh_gate: RefreshGate,
    on_forced_logout: std::sync::Mutex<Option<ForcedLogoutHandler>>,
}

impl HttpClient {
    pub fn new(config: &ApiConfig, tokens: Arc<TokenStore>) -> Result<Self, ApiError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url,
            tokens,
            refresh_gate: RefreshGate::new(),
            on_forced_logout: std::sync::Mutex::new(None),
        })
    }

    /// Registers the reaction to an unrecoverable refresh failure.
    pub fn set_forced_logout_handler(&self, handler: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.on_forced_logout.lock() {
            *slot = Some(Box::new(handler));
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, Some(serde_json::to_value(query)?), None)
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, None, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::POST, path, None, None).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, None, Some(serde_json::to_value(body)?))
            .await
    }

    /// POST whose response body is irrelevant (e.g. bulk submissions).
    pub async fn post_discard(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<(), ApiError> {
        self.send_with_retry(Method::POST, path, &None, &Some(serde_json::to_value(body)?))
            .await?;
        Ok(())
    }

    /// Issues a request and discards the (possibly empty) response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_with_retry(Method::DELETE, path, &None, &None)
            .await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<Value>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let response = self.send_with_retry(method, path, &query, &body).await?;
        Ok(response.json().await?)
    }

    /// Sends the request, attaching the current access token and running the
    /// error branch of the response path in priority order: 403 is terminal,
    /// 401 enters the refresh protocol at most once, everything else becomes
    /// a validation error.
    async fn send_with_retry(
        &self,
        method: Method,
        path: &str,
        query: &Option<Value>,
        body: &Option<Value>,
    ) -> Result<Response, ApiError> {
        let mut retried = false;
        let mut token = self.tokens.access_token();

        loop {
            let response = self
                .dispatch(method.clone(), path, query, body, token.as_deref())
                .await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::FORBIDDEN {
                let body = read_error_body(response).await;
                warn!(path, "Permission denied");
                return Err(ApiError::permission_denied(&body));
            }

            if status == StatusCode::UNAUTHORIZED && !retried {
                // Mark before resending: at most one refresh attempt per request.
                retried = true;
                debug!(path, "Access token rejected, entering refresh protocol");
                token = Some(self.refresh_access_token().await?);
                continue;
            }

            let body = read_error_body(response).await;
            if status == StatusCode::UNAUTHORIZED {
                return Err(ApiError::unauthorized(&body));
            }
            return Err(ApiError::validation(&body));
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &Option<Value>,
        body: &Option<Value>,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        let mut request = self.http.request(method, url);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Obtains a fresh access token, sharing an in-flight refresh when one
    /// exists. Exactly one network call to the refresh endpoint is
    /// outstanding at a time process-wide.
    pub async fn refresh_access_token(&self) -> Result<String, ApiError> {
        match self.refresh_gate.begin().await {
            RefreshRole::Waiter(receiver) => receiver.await.unwrap_or_else(|_| {
                Err(ApiError::Unauthorized {
                    message: "Token refresh was abandoned".to_string(),
                })
            }),
            RefreshRole::Initiator => {
                let outcome = self.perform_refresh().await;
                if let Err(e) = &outcome {
                    error!(error = %e, "Token refresh failed, forcing logout");
                    self.tokens.clear();
                    self.fire_forced_logout();
                }
                self.refresh_gate.finish(&outcome).await;
                outcome
            }
        }
    }

    async fn perform_refresh(&self) -> Result<String, ApiError> {
        let refresh = self
            .tokens
            .refresh_token()
            .ok_or(ApiError::MissingRefreshToken)?;

        let url = self.base_url.join("token/refresh/")?;
        let response = self
            .http
            .post(url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await?;

        if !response.status().is_success() {
            let body = read_error_body(response).await;
            return Err(ApiError::unauthorized(&body));
        }

        let token: AccessToken = response.json().await?;
        self.tokens.set_access_token(&token.access);
        info!("Access token refreshed");
        Ok(token.access)
    }

    fn fire_forced_logout(&self) {
        if let Ok(slot) = self.on_forced_logout.lock() {
            if let Some(handler) = slot.as_ref() {
                handler();
            }
        }
    }
}

/// Reads an error response body as JSON, tolerating empty or non-JSON bodies.
async fn read_error_body(response: Response) -> Value {
    response.json().await.unwrap_or(Value::Null)
}
