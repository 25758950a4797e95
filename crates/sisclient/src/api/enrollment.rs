//! Terms, course offerings, and enrollments.

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{
    CourseOffering, Enrollment, EnrollmentPayload, EnrollmentUpdate, IdRef, ListParams, Listing,
    Term, User,
};
use std::sync::Arc;

pub struct EnrollmentApi {
    backend: Arc<Backend>,
}

impl EnrollmentApi {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    pub async fn terms(&self, params: &ListParams) -> Result<Listing<Term>, ApiError> {
        dispatch!(self, list_terms(params))
    }

    /// The term marked current, falling back to the first term known.
    pub async fn current_term(&self) -> Result<Term, ApiError> {
        dispatch!(self, current_term())
    }

    pub async fn offerings(&self, params: &ListParams) -> Result<Listing<CourseOffering>, ApiError> {
        dispatch!(self, list_offerings(params))
    }

    pub async fn enrolled_students(&self, offering: impl Into<IdRef>) -> Result<Vec<User>, ApiError> {
        dispatch!(self, enrolled_students(&offering.into()))
    }

    pub async fn enrollments(&self, params: &ListParams) -> Result<Listing<Enrollment>, ApiError> {
        dispatch!(self, list_enrollments(params))
    }

    /// The authenticated student's own schedule.
    pub async fn my_enrollments(
        &self,
        params: &ListParams,
    ) -> Result<Listing<Enrollment>, ApiError> {
        dispatch!(self, my_enrollments(params))
    }

    pub async fn enroll(&self, payload: &EnrollmentPayload) -> Result<Enrollment, ApiError> {
        dispatch!(self, create_enrollment(payload))
    }

    pub async fn get(&self, id: impl Into<IdRef>) -> Result<Enrollment, ApiError> {
        dispatch!(self, get_enrollment(&id.into()))
    }

    pub async fn update(
        &self,
        id: impl Into<IdRef>,
        update: &EnrollmentUpdate,
    ) -> Result<Enrollment, ApiError> {
        dispatch!(self, update_enrollment(&id.into(), update))
    }

    /// Drops the enrollment. The mock removes the record outright.
    pub async fn drop(&self, id: impl Into<IdRef>) -> Result<(), ApiError> {
        dispatch!(self, drop_enrollment(&id.into()))
    }
}
