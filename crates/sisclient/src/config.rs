//! Client configuration and backend mode selection.
//!
//! The mode is resolved once at startup and fixed for the process lifetime:
//! an explicit `SIS_API_MODE` takes precedence over the boolean
//! `SIS_USE_MOCKS` toggle.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default base URL for the real backend (local development server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// Default simulated latency for mock operations.
pub const DEFAULT_MOCK_LATENCY: Duration = Duration::from_millis(200);

/// Which backend serves resource calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    /// All resource calls served from the in-memory mock service.
    Mock,
    /// All resource calls go over HTTP to the configured base URL.
    Real,
}

impl ApiMode {
    pub fn is_mock(self) -> bool {
        matches!(self, ApiMode::Mock)
    }
}

/// Resolves the backend mode from configuration values.
///
/// An explicit mode name (`mock`/`real`, case-insensitive) wins over the
/// boolean toggle; anything unrecognized falls through to the toggle, and an
/// absent toggle means the real backend.
pub fn resolve_mode(explicit: Option<&str>, use_mocks: Option<&str>) -> ApiMode {
    match explicit.map(str::to_lowercase).as_deref() {
        Some("mock") => return ApiMode::Mock,
        Some("real") => return ApiMode::Real,
        _ => {}
    }
    match use_mocks.map(str::to_lowercase).as_deref() {
        Some("true") => ApiMode::Mock,
        _ => ApiMode::Real,
    }
}

/// Configuration for a [`crate::SisClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the real backend; all resource paths are relative to it.
    pub base_url: String,
    /// Backend mode, fixed for the client's lifetime.
    pub mode: ApiMode,
    /// Simulated latency applied to every mock operation.
    pub mock_latency: Duration,
    /// File backing the token store. `None` keeps tokens in memory only.
    pub storage_path: Option<PathBuf>,
    /// Connect timeout for the HTTP client.
    pub connect_timeout: Duration,
    /// Overall request timeout for the HTTP client.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            mode: ApiMode::Real,
            mock_latency: DEFAULT_MOCK_LATENCY,
            storage_path: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Builds a configuration from environment variables.
    ///
    /// Reads `SIS_API_BASE_URL`, `SIS_API_MODE`, `SIS_USE_MOCKS`, and
    /// `SIS_TOKEN_FILE`; unset variables keep their defaults.
    pub fn from_env() -> Self {
        let explicit = env::var("SIS_API_MODE").ok();
        let use_mocks = env::var("SIS_USE_MOCKS").ok();
        Self {
            base_url: env::var("SIS_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            mode: resolve_mode(explicit.as_deref(), use_mocks.as_deref()),
            storage_path: env::var("SIS_TOKEN_FILE").ok().map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Configuration for the mock backend with the default seed data.
    pub fn mock() -> Self {
        Self {
            mode: ApiMode::Mock,
            ..Self::default()
        }
    }

    /// Configuration for the real backend at the given base URL.
    pub fn real(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            mode: ApiMode::Real,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_mode_wins_over_toggle() {
        assert_eq!(resolve_mode(Some("mock"), Some("false")), ApiMode::Mock);
        assert_eq!(resolve_mode(Some("real"), Some("true")), ApiMode::Real);
        assert_eq!(resolve_mode(Some("MOCK"), None), ApiMode::Mock);
    }

    #[test]
    fn toggle_applies_when_mode_absent_or_unknown() {
        assert_eq!(resolve_mode(None, Some("true")), ApiMode::Mock);
        assert_eq!(resolve_mode(None, Some("TRUE")), ApiMode::Mock);
        assert_eq!(resolve_mode(Some("staging"), Some("true")), ApiMode::Mock);
        assert_eq!(resolve_mode(None, Some("false")), ApiMode::Real);
        assert_eq!(resolve_mode(None, None), ApiMode::Real);
    }
}
