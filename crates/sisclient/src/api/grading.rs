//! Grade components, grades, and academic records.

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{
    AcademicRecord, GpaSummary, Grade, GradeBatch, GradeComponent, GradeComponentPayload,
    GradePayload, GradeUpdate, IdRef, ListParams, Listing,
};
use std::sync::Arc;

pub struct GradingApi {
    backend: Arc<Backend>,
}

impl GradingApi {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    pub async fn components(&self, params: &ListParams) -> Result<Listing<GradeComponent>, ApiError> {
        dispatch!(self, list_grade_components(params))
    }

    pub async fn create_component(
        &self,
        payload: &GradeComponentPayload,
    ) -> Result<GradeComponent, ApiError> {
        dispatch!(self, create_grade_component(payload))
    }

    /// Submits a batch of grades against one component of an offering.
    pub async fn submit_batch(&self, batch: &GradeBatch) -> Result<(), ApiError> {
        dispatch!(self, submit_grades(batch))
    }

    pub async fn course_grades(&self, offering: impl Into<IdRef>) -> Result<Vec<Grade>, ApiError> {
        dispatch!(self, course_grades(&offering.into()))
    }

    pub async fn grades(&self, params: &ListParams) -> Result<Listing<Grade>, ApiError> {
        dispatch!(self, list_grades(params))
    }

    pub async fn submit(&self, payload: &GradePayload) -> Result<Grade, ApiError> {
        dispatch!(self, submit_grade(payload))
    }

    pub async fn update(
        &self,
        id: impl Into<IdRef>,
        update: &GradeUpdate,
    ) -> Result<Grade, ApiError> {
        dispatch!(self, update_grade(&id.into(), update))
    }

    pub async fn student_grades(
        &self,
        student: impl Into<IdRef>,
        params: &ListParams,
    ) -> Result<Listing<Grade>, ApiError> {
        dispatch!(self, student_grades(&student.into(), params))
    }

    /// Per-term academic record rows derived from enrollments.
    pub async fn academic_records(
        &self,
        params: &ListParams,
    ) -> Result<Listing<AcademicRecord>, ApiError> {
        dispatch!(self, academic_records(params))
    }

    pub async fn calculate_gpa(&self, student: impl Into<IdRef>) -> Result<GpaSummary, ApiError> {
        dispatch!(self, calculate_gpa(&student.into()))
    }
}
