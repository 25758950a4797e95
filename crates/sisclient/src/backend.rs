//! Backend selection and the HTTP resource operations.
//!
//! The backend is chosen once at client construction from [`ApiMode`] and
//! fixed for the process lifetime. Resource modules dispatch every call
//! through [`Backend`]; the mock and HTTP implementations expose the same
//! operations with the same signatures and observable behavior.

use crate::client::HttpClient;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::mock::MockBackend;
use crate::models::*;
use crate::storage::TokenStore;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub enum Backend {
    Mock(MockBackend),
    Http(HttpBackend),
}

impl Backend {
    /// Registers the forced-logout reaction. The mock backend never forces a
    /// logout, so this only matters over HTTP.
    pub fn set_forced_logout_handler(&self, handler: impl Fn() + Send + Sync + 'static) {
        if let Backend::Http(http) = self {
            http.client.set_forced_logout_handler(handler);
        }
    }
}

/// Resource operations against the real backend.
///
/// Thin path-and-payload mapping over [`HttpClient`]; auth headers, error
/// translation, and token refresh all happen in the client core.
pub struct HttpBackend {
    client: HttpClient,
    tokens: Arc<TokenStore>,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig, tokens: Arc<TokenStore>) -> Result<Self, ApiError> {
        Ok(Self {
            client: HttpClient::new(config, Arc::clone(&tokens))?,
            tokens,
        })
    }

    /// Refreshes the access token using the stored refresh token, sharing
    /// any in-flight refresh.
    pub async fn refresh(&self) -> Result<AccessToken, ApiError> {
        let access = self.client.refresh_access_token().await?;
        Ok(AccessToken { access })
    }

    // ---- Auth ----

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let tokens: TokenPair = self
            .client
            .post("token/", &json!({ "username": username, "password": password }))
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized { .. } | ApiError::Validation { .. } => {
                    ApiError::InvalidCredentials
                }
                other => other,
            })?;
        self.tokens.set_tokens(&tokens.access, &tokens.refresh);
        let user: User = self.client.get("users/me/").await?;
        Ok(LoginResponse { tokens, user })
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.client.get("users/me/").await
    }

    // ---- Users ----

    pub async fn list_users(&self, params: &ListParams) -> Result<Listing<User>, ApiError> {
        self.client.get_with("users/with-info/", params).await
    }

    pub async fn get_user(&self, id: &IdRef) -> Result<User, ApiError> {
        let id = path_id(id)?;
        self.client.get(&format!("users/{id}/with-info/")).await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.client
            .post("users/create-with-personal-info/", payload)
            .await
    }

    /// Users are updated in up to three calls (core record, personal info,
    /// contact info); the authoritative record is re-fetched afterwards.
    pub async fn update_user(&self, id: &IdRef, payload: &UserPayload) -> Result<User, ApiError> {
        let id = path_id(id)?;

        let core = core_user_fields(payload)?;
        if !core.is_empty() {
            let _: Value = self.client.put(&format!("users/{id}/"), &core).await?;
        }
        let personal = personal_fields(payload);
        if !is_empty_payload(&personal)? {
            let _: Value = self
                .client
                .put(&format!("users/{id}/personal-info/"), &personal)
                .await?;
        }
        let contact = contact_fields(payload);
        if !is_empty_payload(&contact)? {
            let _: Value = self
                .client
                .put(&format!("users/{id}/contact-info/"), &contact)
                .await?;
        }

        self.client.get(&format!("users/{id}/with-info/")).await
    }

    pub async fn delete_user(&self, id: &IdRef) -> Result<(), ApiError> {
        let id = path_id(id)?;
        self.client.delete(&format!("users/{id}/")).await
    }

    pub async fn user_profile(&self) -> Result<User, ApiError> {
        self.client.get("users/profile/").await
    }

    pub async fn update_profile(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.client.put("users/profile/", payload).await
    }

    // ---- Departments ----

    pub async fn list_departments(
        &self,
        params: &ListParams,
    ) -> Result<Listing<Department>, ApiError> {
        self.client.get_with("departments/", params).await
    }

    pub async fn get_department(&self, id: &IdRef) -> Result<Department, ApiError> {
        let id = path_id(id)?;
        self.client.get(&format!("departments/{id}/")).await
    }

    pub async fn create_department(
        &self,
        payload: &DepartmentPayload,
    ) -> Result<Department, ApiError> {
        self.client.post("departments/", payload).await
    }

    pub async fn update_department(
        &self,
        id: &IdRef,
        payload: &DepartmentPayload,
    ) -> Result<Department, ApiError> {
        let id = path_id(id)?;
        self.client.put(&format!("departments/{id}/"), payload).await
    }

    pub async fn delete_department(&self, id: &IdRef) -> Result<(), ApiError> {
        let id = path_id(id)?;
        self.client.delete(&format!("departments/{id}/")).await
    }

    pub async fn department_faculty(&self, id: &IdRef) -> Result<Vec<User>, ApiError> {
        let id = path_id(id)?;
        self.client
            .get(&format!("departments/{id}/faculty_members/"))
            .await
    }

    pub async fn department_courses(&self, id: &IdRef) -> Result<Vec<Course>, ApiError> {
        let id = path_id(id)?;
        self.client.get(&format!("departments/{id}/courses/")).await
    }

    // ---- Academic ----

    pub async fn list_programs(&self, params: &ListParams) -> Result<Listing<Program>, ApiError> {
        self.client.get_with("academic/programs/", params).await
    }

    pub async fn create_program(&self, payload: &ProgramPayload) -> Result<Program, ApiError> {
        self.client.post("academic/programs/", payload).await
    }

    pub async fn get_program(&self, id: &IdRef) -> Result<Program, ApiError> {
        let id = path_id(id)?;
        self.client.get(&format!("academic/programs/{id}/")).await
    }

    pub async fn program_courses(&self, id: &IdRef) -> Result<Listing<Course>, ApiError> {
        let id = path_id(id)?;
        self.client
            .get(&format!("academic/programs/{id}/courses/"))
            .await
    }

    pub async fn list_courses(&self, params: &ListParams) -> Result<Listing<Course>, ApiError> {
        self.client.get_with("academic/courses/", params).await
    }

    pub async fn get_course(&self, id: &IdRef) -> Result<Course, ApiError> {
        let id = path_id(id)?;
        self.client.get(&format!("academic/courses/{id}/")).await
    }

    pub async fn create_course(&self, payload: &CoursePayload) -> Result<Course, ApiError> {
        self.client
            .post("academic/courses/", &course_body(payload)?)
            .await
    }

    pub async fn update_course(
        &self,
        id: &IdRef,
        payload: &CoursePayload,
    ) -> Result<Course, ApiError> {
        let id = path_id(id)?;
        self.client
            .put(&format!("academic/courses/{id}/"), &course_body(payload)?)
            .await
    }

    pub async fn delete_course(&self, id: &IdRef) -> Result<(), ApiError> {
        let id = path_id(id)?;
        self.client.delete(&format!("academic/courses/{id}/")).await
    }

    pub async fn course_prerequisites(&self, id: &IdRef) -> Result<Vec<Prerequisite>, ApiError> {
        let id = path_id(id)?;
        self.client
            .get(&format!("academic/courses/{id}/prerequisites/"))
            .await
    }

    // ---- Enrollment ----

    pub async fn list_terms(&self, params: &ListParams) -> Result<Listing<Term>, ApiError> {
        self.client.get_with("enrollment/terms/", params).await
    }

    pub async fn current_term(&self) -> Result<Term, ApiError> {
        self.client.get("enrollment/terms/current/").await
    }

    pub async fn list_offerings(
        &self,
        params: &ListParams,
    ) -> Result<Listing<CourseOffering>, ApiError> {
        self.client.get_with("enrollment/offerings/", params).await
    }

    pub async fn enrolled_students(&self, offering: &IdRef) -> Result<Vec<User>, ApiError> {
        let id = path_id(offering)?;
        self.client
            .get(&format!("enrollment/offerings/{id}/enrolled_students/"))
            .await
    }

    pub async fn list_enrollments(
        &self,
        params: &ListParams,
    ) -> Result<Listing<Enrollment>, ApiError> {
        self.client.get_with("enrollment/enrollments/", params).await
    }

    pub async fn my_enrollments(
        &self,
        params: &ListParams,
    ) -> Result<Listing<Enrollment>, ApiError> {
        self.client
            .get_with("enrollment/enrollments/my_schedule/", params)
            .await
    }

    pub async fn create_enrollment(
        &self,
        payload: &EnrollmentPayload,
    ) -> Result<Enrollment, ApiError> {
        self.client.post("enrollment/enrollments/", payload).await
    }

    pub async fn get_enrollment(&self, id: &IdRef) -> Result<Enrollment, ApiError> {
        let id = path_id(id)?;
        self.client
            .get(&format!("enrollment/enrollments/{id}/"))
            .await
    }

    pub async fn update_enrollment(
        &self,
        id: &IdRef,
        update: &EnrollmentUpdate,
    ) -> Result<Enrollment, ApiError> {
        let id = path_id(id)?;
        self.client
            .put(&format!("enrollment/enrollments/{id}/"), update)
            .await
    }

    pub async fn drop_enrollment(&self, id: &IdRef) -> Result<(), ApiError> {
        let id = path_id(id)?;
        self.client
            .post_discard(
                &format!("enrollment/enrollments/{id}/drop_course/"),
                &json!({}),
            )
            .await
    }

    // ---- Attendance ----

    pub async fn list_attendance(
        &self,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        self.client.get_with("attendance/", params).await
    }

    pub async fn my_attendance(
        &self,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        self.client.get_with("attendance/my_attendance/", params).await
    }

    pub async fn create_attendance(
        &self,
        payload: &AttendancePayload,
    ) -> Result<AttendanceRecord, ApiError> {
        self.client.post("attendance/", payload).await
    }

    pub async fn bulk_create_attendance(
        &self,
        payload: &BulkAttendance,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.client.post("attendance/bulk_create/", payload).await
    }

    pub async fn update_attendance(
        &self,
        id: &IdRef,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord, ApiError> {
        let id = path_id(id)?;
        self.client.put(&format!("attendance/{id}/"), update).await
    }

    pub async fn student_report(
        &self,
        student: &IdRef,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        let id = path_id(student)?;
        self.client
            .get_with(&format!("attendance/student_report/{id}/"), params)
            .await
    }

    pub async fn course_report(
        &self,
        course_offering: &IdRef,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        let id = path_id(course_offering)?;
        self.client
            .get_with(&format!("attendance/course_report/{id}/"), params)
            .await
    }

    // ---- Grading ----

    pub async fn list_grade_components(
        &self,
        params: &ListParams,
    ) -> Result<Listing<GradeComponent>, ApiError> {
        self.client.get_with("grading/components/", params).await
    }

    pub async fn create_grade_component(
        &self,
        payload: &GradeComponentPayload,
    ) -> Result<GradeComponent, ApiError> {
        self.client.post("grading/components/", payload).await
    }

    pub async fn submit_grades(&self, batch: &GradeBatch) -> Result<(), ApiError> {
        self.client
            .post_discard("grading/grades/bulk_submit/", batch)
            .await
    }

    pub async fn course_grades(&self, offering: &IdRef) -> Result<Vec<Grade>, ApiError> {
        let id = path_id(offering)?;
        self.client
            .get(&format!("grading/grades/course_grades/{id}/"))
            .await
    }

    pub async fn list_grades(&self, params: &ListParams) -> Result<Listing<Grade>, ApiError> {
        self.client.get_with("grading/grades/", params).await
    }

    pub async fn submit_grade(&self, payload: &GradePayload) -> Result<Grade, ApiError> {
        self.client.post("grading/grades/", payload).await
    }

    pub async fn update_grade(&self, id: &IdRef, update: &GradeUpdate) -> Result<Grade, ApiError> {
        let id = path_id(id)?;
        self.client.put(&format!("grading/grades/{id}/"), update).await
    }

    pub async fn student_grades(
        &self,
        student: &IdRef,
        params: &ListParams,
    ) -> Result<Listing<Grade>, ApiError> {
        let id = path_id(student)?;
        self.client
            .get_with(&format!("grading/grades/student_grades/{id}/"), params)
            .await
    }

    pub async fn academic_records(
        &self,
        params: &ListParams,
    ) -> Result<Listing<AcademicRecord>, ApiError> {
        self.client.get_with("grading/academic-records/", params).await
    }

    pub async fn calculate_gpa(&self, student: &IdRef) -> Result<GpaSummary, ApiError> {
        let id = path_id(student)?;
        self.client
            .get(&format!("grading/academic-records/calculate_gpa/{id}/"))
            .await
    }
}

/// Coerces a reference to a numeric id usable in a URL path.
fn path_id(id: &IdRef) -> Result<i64, ApiError> {
    id.normalize().ok_or_else(|| ApiError::Validation {
        message: "id: expected a numeric id".to_string(),
    })
}

/// Serializes the course payload, flattening prerequisites into the
/// `prerequisite_courses` wire field the backend expects.
fn course_body(payload: &CoursePayload) -> Result<Value, ApiError> {
    let mut body = serde_json::to_value(payload)?;
    if let Some(object) = body.as_object_mut() {
        if object.remove("prerequisites").is_some() {
            let entries: Vec<Value> = payload
                .prerequisites
                .as_deref()
                .unwrap_or_default()
                .iter()
                .filter_map(PrereqInput::normalize)
                .map(|p| {
                    json!({
                        "course_id": p.required_course,
                        "minimum_grade": p.minimum_grade,
                    })
                })
                .collect();
            object.insert("prerequisite_courses".to_string(), Value::Array(entries));
        }
    }
    Ok(body)
}

/// Fields belonging to the core user record (not the info sub-resources).
fn core_user_fields(payload: &UserPayload) -> Result<Map<String, Value>, ApiError> {
    let mut core = Map::new();
    if let Some(username) = &payload.username {
        core.insert("username".to_string(), json!(username));
    }
    if let Some(email) = &payload.email {
        core.insert("email".to_string(), json!(email));
    }
    if let Some(role) = payload.role {
        core.insert("role".to_string(), serde_json::to_value(role)?);
    }
    if let Some(department) = &payload.department {
        core.insert("department".to_string(), serde_json::to_value(department)?);
    }
    Ok(core)
}

/// Nested personal info wins over flat fallbacks when both are present.
fn personal_fields(payload: &UserPayload) -> PersonalInfoPayload {
    let nested = payload.personal_info.clone().unwrap_or_default();
    PersonalInfoPayload {
        first_name: nested.first_name.or_else(|| payload.first_name.clone()),
        middle_name: nested.middle_name,
        last_name: nested.last_name.or_else(|| payload.last_name.clone()),
        gender: nested.gender.or_else(|| payload.gender.clone()),
        date_of_birth: nested.date_of_birth.or(payload.date_of_birth),
        national_id: nested.national_id.or_else(|| payload.national_id.clone()),
    }
}

fn contact_fields(payload: &UserPayload) -> ContactInfoPayload {
    let nested = payload.contact_info.clone().unwrap_or_default();
    ContactInfoPayload {
        primary_phone: nested.primary_phone.or_else(|| payload.primary_phone.clone()),
        emergency_contact_name: nested.emergency_contact_name,
        emergency_contact_phone: nested.emergency_contact_phone,
        emergency_contact_relation: nested.emergency_contact_relation,
        address: nested.address.or_else(|| payload.address.clone()),
        city: nested.city.or_else(|| payload.city.clone()),
        state: nested.state.or_else(|| payload.state.clone()),
        country: nested.country.or_else(|| payload.country.clone()),
    }
}

/// True when every field of the payload is unset (serializes to `{}`).
fn is_empty_payload(payload: &impl serde::Serialize) -> Result<bool, ApiError> {
    Ok(serde_json::to_value(payload)?
        .as_object()
        .is_some_and(Map::is_empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_body_flattens_prerequisites() {
        let payload = CoursePayload {
            course_code: Some("CS401".to_string()),
            prerequisites: Some(vec![
                PrereqInput::Bare(IdRef::from(3)),
                PrereqInput::Entry {
                    required_course: IdRef::from("2"),
                    minimum_grade: Some(2.5),
                },
            ]),
            ..CoursePayload::default()
        };
        let body = course_body(&payload).unwrap();
        assert!(body.get("prerequisites").is_none());
        assert_eq!(
            body["prerequisite_courses"],
            json!([
                { "course_id": 3, "minimum_grade": 2.0 },
                { "course_id": 2, "minimum_grade": 2.5 },
            ])
        );
    }

    #[test]
    fn empty_payload_detection_skips_untouched_sub_resources() {
        let payload = UserPayload {
            email: Some("new@sis.test".to_string()),
            ..UserPayload::default()
        };
        assert!(is_empty_payload(&personal_fields(&payload)).unwrap());
        assert!(is_empty_payload(&contact_fields(&payload)).unwrap());
        assert!(!core_user_fields(&payload).unwrap().is_empty());
    }
}
