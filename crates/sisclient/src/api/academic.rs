//! Academic catalog: programs, courses, and prerequisites.

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{
    Course, CoursePayload, IdRef, ListParams, Listing, Prerequisite, Program, ProgramPayload,
};
use std::sync::Arc;

pub struct AcademicApi {
    backend: Arc<Backend>,
}

impl AcademicApi {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    pub async fn programs(&self, params: &ListParams) -> Result<Listing<Program>, ApiError> {
        dispatch!(self, list_programs(params))
    }

    pub async fn program(&self, id: impl Into<IdRef>) -> Result<Program, ApiError> {
        dispatch!(self, get_program(&id.into()))
    }

    pub async fn create_program(&self, payload: &ProgramPayload) -> Result<Program, ApiError> {
        dispatch!(self, create_program(payload))
    }

    /// Courses belonging to the program's department.
    pub async fn program_courses(&self, id: impl Into<IdRef>) -> Result<Listing<Course>, ApiError> {
        dispatch!(self, program_courses(&id.into()))
    }

    pub async fn courses(&self, params: &ListParams) -> Result<Listing<Course>, ApiError> {
        dispatch!(self, list_courses(params))
    }

    pub async fn course(&self, id: impl Into<IdRef>) -> Result<Course, ApiError> {
        dispatch!(self, get_course(&id.into()))
    }

    pub async fn create_course(&self, payload: &CoursePayload) -> Result<Course, ApiError> {
        dispatch!(self, create_course(payload))
    }

    pub async fn update_course(
        &self,
        id: impl Into<IdRef>,
        payload: &CoursePayload,
    ) -> Result<Course, ApiError> {
        dispatch!(self, update_course(&id.into(), payload))
    }

    /// Deletes a course; offerings referencing it are removed as well.
    pub async fn delete_course(&self, id: impl Into<IdRef>) -> Result<(), ApiError> {
        dispatch!(self, delete_course(&id.into()))
    }

    pub async fn prerequisites(
        &self,
        id: impl Into<IdRef>,
    ) -> Result<Vec<Prerequisite>, ApiError> {
        dispatch!(self, course_prerequisites(&id.into()))
    }
}
