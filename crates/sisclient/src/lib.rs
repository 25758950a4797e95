//! Client library for a student information system backend.
//!
//! The client speaks to one of two interchangeable backends, chosen once at
//! construction: the real HTTP API (with bearer auth and transparent
//! single-flight token refresh) or an in-memory mock service that emulates
//! the same contract with seeded data and simulated latency. Resource
//! modules ([`api`]) expose the same surface either way.
//!
//! ```no_run
//! use sisclient::{ApiConfig, SisClient};
//!
//! # async fn run() -> Result<(), sisclient::ApiError> {
//! let client = SisClient::new(&ApiConfig::mock())?;
//! let user = client.auth().login("student", "password").await?;
//! let schedule = client.enrollment().my_enrollments(&Default::default()).await?;
//! println!("{} has {} enrollments", user.username, schedule.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod models;
pub mod storage;

pub use api::{
    AcademicApi, AttendanceApi, AuthApi, DepartmentsApi, EnrollmentApi, GradingApi, UsersApi,
};
pub use config::{ApiConfig, ApiMode};
pub use error::ApiError;
pub use mock::MockStore;
pub use storage::TokenStore;

use backend::{Backend, HttpBackend};
use mock::MockBackend;
use std::sync::Arc;
use tracing::info;

/// Entry point: owns the selected backend and the token store, and hands out
/// per-resource API handles.
pub struct SisClient {
    backend: Arc<Backend>,
    tokens: Arc<TokenStore>,
    mode: ApiMode,
}

impl SisClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let tokens = Arc::new(match &config.storage_path {
            Some(path) => TokenStore::at_path(path)?,
            None => TokenStore::in_memory(),
        });
        match config.mode {
            ApiMode::Mock => Self::with_mock_store(Arc::new(MockStore::seeded()), config, tokens),
            ApiMode::Real => {
                let backend = Backend::Http(HttpBackend::new(config, Arc::clone(&tokens))?);
                info!(base_url = %config.base_url, "Using HTTP backend");
                Ok(Self {
                    backend: Arc::new(backend),
                    tokens,
                    mode: ApiMode::Real,
                })
            }
        }
    }

    /// Builds a client from `SIS_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(&ApiConfig::from_env())
    }

    /// A mock-mode client over a caller-supplied store, so tests can work
    /// against isolated data sets.
    pub fn with_mock_store(
        store: Arc<MockStore>,
        config: &ApiConfig,
        tokens: Arc<TokenStore>,
    ) -> Result<Self, ApiError> {
        let backend = Backend::Mock(MockBackend::new(
            store,
            config.mock_latency,
            Arc::clone(&tokens),
        ));
        info!("Using mock backend");
        Ok(Self {
            backend: Arc::new(backend),
            tokens,
            mode: ApiMode::Mock,
        })
    }

    pub fn mode(&self) -> ApiMode {
        self.mode
    }

    pub fn token_store(&self) -> Arc<TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Registers the reaction to an unrecoverable token refresh failure
    /// (cleared session, e.g. redirect to a login screen).
    pub fn set_forced_logout_handler(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.backend.set_forced_logout_handler(handler);
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(Arc::clone(&self.backend), Arc::clone(&self.tokens))
    }

    pub fn users(&self) -> UsersApi {
        UsersApi::new(Arc::clone(&self.backend))
    }

    pub fn departments(&self) -> DepartmentsApi {
        DepartmentsApi::new(Arc::clone(&self.backend))
    }

    pub fn academic(&self) -> AcademicApi {
        AcademicApi::new(Arc::clone(&self.backend))
    }

    pub fn enrollment(&self) -> EnrollmentApi {
        EnrollmentApi::new(Arc::clone(&self.backend))
    }

    pub fn attendance(&self) -> AttendanceApi {
        AttendanceApi::new(Arc::clone(&self.backend))
    }

    pub fn grading(&self) -> GradingApi {
        GradingApi::new(Arc::clone(&self.backend))
    }
}
