//! User accounts and profile management.

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{IdRef, ListParams, Listing, User, UserPayload};
use std::sync::Arc;

pub struct UsersApi {
    backend: Arc<Backend>,
}

impl UsersApi {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    /// Lists users with their personal and contact info embedded.
    pub async fn list(&self, params: &ListParams) -> Result<Listing<User>, ApiError> {
        dispatch!(self, list_users(params))
    }

    pub async fn get(&self, id: impl Into<IdRef>) -> Result<User, ApiError> {
        dispatch!(self, get_user(&id.into()))
    }

    pub async fn create(&self, payload: &UserPayload) -> Result<User, ApiError> {
        dispatch!(self, create_user(payload))
    }

    pub async fn update(
        &self,
        id: impl Into<IdRef>,
        payload: &UserPayload,
    ) -> Result<User, ApiError> {
        dispatch!(self, update_user(&id.into(), payload))
    }

    pub async fn delete(&self, id: impl Into<IdRef>) -> Result<(), ApiError> {
        dispatch!(self, delete_user(&id.into()))
    }

    /// The authenticated user's own profile.
    pub async fn profile(&self) -> Result<User, ApiError> {
        dispatch!(self, user_profile())
    }

    pub async fn update_profile(&self, payload: &UserPayload) -> Result<User, ApiError> {
        dispatch!(self, update_profile(payload))
    }
}
