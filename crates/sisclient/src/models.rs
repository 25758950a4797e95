//! Resource models shared by the HTTP and mock backends.
//!
//! The shapes mirror the backend's resource model: entity cross-references
//! (a course's department, an enrollment's offering) are embedded by value,
//! and a handful of fields are duplicated under legacy aliases
//! (`code`/`department_code`, `credits`/`credit_hours`, `head`/`head_faculty`)
//! for compatibility with older consumers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A loosely typed reference to a record: a bare id, a numeric string, or an
/// embedded entity carrying an `id` field.
///
/// String ids that parse as integers are coerced before comparison, so `"3"`
/// and `3` address the same record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IdRef {
    Id(i64),
    Text(String),
    Entity { id: i64 },
}

impl IdRef {
    /// Coerces the reference to an integer id, if possible.
    pub fn normalize(&self) -> Option<i64> {
        match self {
            IdRef::Id(id) => Some(*id),
            IdRef::Text(text) => text.trim().parse().ok(),
            IdRef::Entity { id } => Some(*id),
        }
    }
}

impl From<i64> for IdRef {
    fn from(id: i64) -> Self {
        IdRef::Id(id)
    }
}

impl From<i32> for IdRef {
    fn from(id: i32) -> Self {
        IdRef::Id(id.into())
    }
}

impl From<&str> for IdRef {
    fn from(text: &str) -> Self {
        IdRef::Text(text.to_string())
    }
}

impl From<String> for IdRef {
    fn from(text: String) -> Self {
        IdRef::Text(text)
    }
}

/// Result of a list operation: a paginated wrapper when the caller supplied
/// page parameters, otherwise the plain filtered list. Callers must handle
/// both shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    /// Total number of items after filtering, across all pages.
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Listing<T> {
    /// Consumes the listing, discarding pagination metadata.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Paged(page) => page.results,
            Listing::Plain(items) => items,
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Paged(page) => &page.results,
            Listing::Plain(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// Optional filters and pagination for list operations.
///
/// Filters that do not apply to a given resource are ignored. `None` fields
/// are omitted from the query string when talking to the real backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, alias = "pageSize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_offering_id: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl ListParams {
    /// Parameters requesting a specific page.
    pub fn paged(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    /// Parameters carrying only a free-text search term.
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

// ---- Users ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub national_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub primary_phone: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
    #[serde(default)]
    pub emergency_contact_relation: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Plaintext, mock mode only; the real backend never returns it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub contact_info: ContactInfo,
}

// ---- Departments ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub department_code: String,
    /// Duplicate of `department_code`, kept for compatibility.
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    /// Weak reference to a faculty user; not validated by the mock.
    #[serde(default)]
    pub head_faculty: Option<i64>,
    /// Duplicate of `head_faculty`, kept for compatibility.
    #[serde(default)]
    pub head: Option<i64>,
}

// ---- Academic ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub program_code: String,
    pub name: String,
    pub department_id: i64,
    pub total_credits_required: u32,
    pub minimum_gpa: f64,
    pub degree_level: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prerequisite {
    pub required_course: i64,
    pub minimum_grade: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub course_code: String,
    /// Duplicate of `course_code`, kept for compatibility.
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub credit_hours: u32,
    /// Duplicate of `credit_hours`, kept for compatibility.
    pub credits: u32,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub department_id: Option<i64>,
    pub course_level: u32,
    pub is_active: bool,
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
}

// ---- Enrollment ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OfferingStatus {
    Open,
    Closed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOffering {
    pub id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub course: Option<Course>,
    #[serde(default)]
    pub term: Option<Term>,
    #[serde(default)]
    pub faculty: Option<User>,
    pub section_number: String,
    pub capacity: u32,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub room: String,
    pub status: OfferingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Dropped,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub course_offering: CourseOffering,
    pub student: User,
    pub enrollment_date: DateTime<Utc>,
    pub status: EnrollmentStatus,
}

// ---- Attendance ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub course_offering_id: i64,
    pub date: NaiveDate,
    pub student_id: i64,
    pub status: AttendanceStatus,
}

// ---- Grading ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeComponent {
    pub id: i64,
    pub course_offering_id: i64,
    pub name: String,
    /// Percentage weight of this component within the offering.
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub enrollment_id: i64,
    pub course_offering_id: i64,
    pub grade_component_id: i64,
    pub score: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Flattened per-term view of a student's enrollments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub student_id: i64,
    pub term: String,
    pub course: String,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpaSummary {
    pub gpa: f64,
}

// ---- Auth ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub tokens: TokenPair,
    pub user: User,
}

// ---- Write payloads ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Create/update payload for users.
///
/// Personal and contact details may arrive nested or as flat top-level
/// fields; nested values win when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, alias = "department_id", skip_serializing_if = "Option::is_none")]
    pub department: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfoPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfoPayload>,
    // Flat fallbacks accepted by older form submissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_faculty: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<IdRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramPayload {
    pub program_code: String,
    pub name: String,
    pub department_id: i64,
    pub total_credits_required: u32,
    pub minimum_gpa: f64,
    pub degree_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A prerequisite as supplied by callers: either a full entry or a bare
/// course reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrereqInput {
    Entry {
        #[serde(alias = "course_id")]
        required_course: IdRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum_grade: Option<f64>,
    },
    Bare(IdRef),
}

impl PrereqInput {
    /// Normalizes to the stored shape, defaulting the minimum grade to 2.0.
    pub fn normalize(&self) -> Option<Prerequisite> {
        match self {
            PrereqInput::Entry {
                required_course,
                minimum_grade,
            } => Some(Prerequisite {
                required_course: required_course.normalize()?,
                minimum_grade: minimum_grade.unwrap_or(2.0),
            }),
            PrereqInput::Bare(id) => Some(Prerequisite {
                required_course: id.normalize()?,
                minimum_grade: 2.0,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "credits", skip_serializing_if = "Option::is_none")]
    pub credit_hours: Option<u32>,
    #[serde(default, alias = "department_id", skip_serializing_if = "Option::is_none")]
    pub department: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(
        default,
        alias = "prerequisite_courses",
        skip_serializing_if = "Option::is_none"
    )]
    pub prerequisites: Option<Vec<PrereqInput>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<IdRef>,
    #[serde(default, alias = "course_id", skip_serializing_if = "Option::is_none")]
    pub course: Option<IdRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EnrollmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendancePayload {
    pub course_offering_id: i64,
    pub date: NaiveDate,
    pub student_id: i64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Envelope for bulk attendance entry: every record is stamped with the
/// shared offering id and date before insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAttendance {
    pub course_offering_id: i64,
    pub date: NaiveDate,
    pub attendance_records: Vec<BulkAttendanceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAttendanceEntry {
    pub student_id: i64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeComponentPayload {
    pub name: String,
    pub weight: f64,
    pub course_offering_id: i64,
}

/// Envelope for batch grade submission against one component of an offering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeBatch {
    pub course_offering_id: i64,
    pub grade_component_id: i64,
    pub grades: Vec<GradeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEntry {
    pub enrollment_id: i64,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradePayload {
    pub enrollment_id: i64,
    pub course_offering_id: i64,
    pub grade_component_id: i64,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_ref_normalizes_strings_and_entities() {
        assert_eq!(IdRef::from(3).normalize(), Some(3));
        assert_eq!(IdRef::from("3").normalize(), Some(3));
        assert_eq!(IdRef::Entity { id: 3 }.normalize(), Some(3));
        assert_eq!(IdRef::from("abc").normalize(), None);
    }

    #[test]
    fn listing_deserializes_both_shapes() {
        let plain: Listing<i64> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert!(matches!(plain, Listing::Plain(_)));
        assert_eq!(plain.len(), 3);

        let paged: Listing<i64> = serde_json::from_value(json!({
            "results": [4, 5, 6],
            "count": 10,
            "page": 2,
            "page_size": 3
        }))
        .unwrap();
        match paged {
            Listing::Paged(page) => {
                assert_eq!(page.results, vec![4, 5, 6]);
                assert_eq!(page.count, 10);
            }
            Listing::Plain(_) => panic!("expected paged shape"),
        }
    }

    #[test]
    fn prereq_input_accepts_all_wire_shapes() {
        let inputs: Vec<PrereqInput> = serde_json::from_value(json!([
            { "required_course": 1, "minimum_grade": 2.5 },
            { "course_id": "2" },
            3
        ]))
        .unwrap();
        let normalized: Vec<Prerequisite> =
            inputs.iter().filter_map(PrereqInput::normalize).collect();
        assert_eq!(
            normalized,
            vec![
                Prerequisite { required_course: 1, minimum_grade: 2.5 },
                Prerequisite { required_course: 2, minimum_grade: 2.0 },
                Prerequisite { required_course: 3, minimum_grade: 2.0 },
            ]
        );
    }

    #[test]
    fn list_params_accepts_camel_case_page_size() {
        let params: ListParams =
            serde_json::from_value(json!({ "page": 1, "pageSize": 25 })).unwrap();
        assert_eq!(params.page_size, Some(25));
    }
}
