//! Departments and their related faculty and courses.

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{Course, Department, DepartmentPayload, IdRef, ListParams, Listing, User};
use std::sync::Arc;

pub struct DepartmentsApi {
    backend: Arc<Backend>,
}

impl DepartmentsApi {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Listing<Department>, ApiError> {
        dispatch!(self, list_departments(params))
    }

    pub async fn get(&self, id: impl Into<IdRef>) -> Result<Department, ApiError> {
        dispatch!(self, get_department(&id.into()))
    }

    pub async fn create(&self, payload: &DepartmentPayload) -> Result<Department, ApiError> {
        dispatch!(self, create_department(payload))
    }

    pub async fn update(
        &self,
        id: impl Into<IdRef>,
        payload: &DepartmentPayload,
    ) -> Result<Department, ApiError> {
        dispatch!(self, update_department(&id.into(), payload))
    }

    pub async fn delete(&self, id: impl Into<IdRef>) -> Result<(), ApiError> {
        dispatch!(self, delete_department(&id.into()))
    }

    /// Faculty members assigned to the department.
    pub async fn faculty(&self, id: impl Into<IdRef>) -> Result<Vec<User>, ApiError> {
        dispatch!(self, department_faculty(&id.into()))
    }

    /// Courses offered by the department.
    pub async fn courses(&self, id: impl Into<IdRef>) -> Result<Vec<Course>, ApiError> {
        dispatch!(self, department_courses(&id.into()))
    }
}
