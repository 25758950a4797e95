//! Attendance recording and reports.

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{
    AttendancePayload, AttendanceRecord, AttendanceUpdate, BulkAttendance, IdRef, ListParams,
    Listing,
};
use std::sync::Arc;

pub struct AttendanceApi {
    backend: Arc<Backend>,
}

impl AttendanceApi {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Listing<AttendanceRecord>, ApiError> {
        dispatch!(self, list_attendance(params))
    }

    /// The authenticated student's own attendance.
    pub async fn mine(&self, params: &ListParams) -> Result<Listing<AttendanceRecord>, ApiError> {
        dispatch!(self, my_attendance(params))
    }

    pub async fn record(&self, payload: &AttendancePayload) -> Result<AttendanceRecord, ApiError> {
        dispatch!(self, create_attendance(payload))
    }

    /// Records attendance for a whole session in one call; every entry is
    /// stamped with the envelope's offering id and date.
    pub async fn record_bulk(
        &self,
        payload: &BulkAttendance,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        dispatch!(self, bulk_create_attendance(payload))
    }

    pub async fn update(
        &self,
        id: impl Into<IdRef>,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord, ApiError> {
        dispatch!(self, update_attendance(&id.into(), update))
    }

    pub async fn student_report(
        &self,
        student: impl Into<IdRef>,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        dispatch!(self, student_report(&student.into(), params))
    }

    pub async fn course_report(
        &self,
        course_offering: impl Into<IdRef>,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        dispatch!(self, course_report(&course_offering.into(), params))
    }
}
