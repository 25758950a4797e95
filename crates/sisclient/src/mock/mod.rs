//! In-memory mock backend.
//!
//! Emulates the same observable contract as the HTTP backend for every
//! resource so the client can run without a live server. Every operation is
//! async, simulates network latency, and returns independent copies of the
//! stored records; mutating a returned value never affects internal state.

mod seed;
mod store;

pub use store::MockStore;

use crate::error::ApiError;
use crate::models::*;
use crate::storage::TokenStore;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use store::{next_id, paginate, search_filter};
use tracing::debug;

const MOCK_ACCESS_PREFIX: &str = "mock-access-";
const MOCK_REFRESH_PREFIX: &str = "mock-refresh-";

pub struct MockBackend {
    store: Arc<MockStore>,
    latency: Duration,
    tokens: Arc<TokenStore>,
}

impl MockBackend {
    pub fn new(store: Arc<MockStore>, latency: Duration, tokens: Arc<TokenStore>) -> Self {
        Self {
            store,
            latency,
            tokens,
        }
    }

    /// Simulated network delay with a little jitter, applied to every
    /// operation before it resolves.
    async fn simulate(&self) {
        if self.latency.is_zero() {
            return;
        }
        let base = self.latency.as_millis() as u64;
        let jitter = rand::thread_rng().gen_range(0..=base / 5);
        tokio::time::sleep(Duration::from_millis(base + jitter)).await;
    }

    // ---- Auth ----

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let user = data
                .users
                .iter()
                .find(|u| u.username == username)
                .ok_or(ApiError::InvalidCredentials)?;
            if let Some(expected) = &user.password {
                if expected != password {
                    return Err(ApiError::InvalidCredentials);
                }
            }
            debug!(user_id = user.id, "Mock login succeeded");
            Ok(LoginResponse {
                tokens: TokenPair {
                    access: format!("{MOCK_ACCESS_PREFIX}{}", user.id),
                    refresh: format!("{MOCK_REFRESH_PREFIX}{}", user.id),
                },
                user: data.resolved_user(user),
            })
        })
    }

    /// Validates the synthetic refresh token and mints a new access token
    /// preserving the encoded user id.
    pub async fn refresh_token(&self, refresh: &str) -> Result<AccessToken, ApiError> {
        self.simulate().await;
        let user_id: i64 = refresh
            .strip_prefix(MOCK_REFRESH_PREFIX)
            .and_then(|rest| rest.parse().ok())
            .ok_or(ApiError::InvalidRefreshToken)?;
        Ok(AccessToken {
            access: format!("{MOCK_ACCESS_PREFIX}{user_id}"),
        })
    }

    /// Resolves the current user from the stored mock user id, falling back
    /// to the first seeded user.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.simulate().await;
        let stored = self.tokens.mock_user_id();
        self.store.with(|data| {
            let user = stored
                .and_then(|id| data.users.iter().find(|u| u.id == id))
                .or_else(|| data.users.first())
                .ok_or(ApiError::NotFound { resource: "User" })?;
            Ok(data.resolved_user(user))
        })
    }

    // ---- Users ----

    pub async fn list_users(&self, params: &ListParams) -> Result<Listing<User>, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let mut users: Vec<User> = data.users.clone();
            if let Some(role) = params.role {
                users.retain(|u| u.role == role);
            }
            let users = search_filter(
                users,
                &[
                    "username",
                    "email",
                    "personal_info.first_name",
                    "personal_info.last_name",
                ],
                params.search.as_deref(),
            );
            let users = users.iter().map(|u| data.resolved_user(u)).collect();
            Ok(paginate(users, params))
        })
    }

    pub async fn get_user(&self, id: &IdRef) -> Result<User, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            data.users
                .iter()
                .find(|u| Some(u.id) == id)
                .map(|u| data.resolved_user(u))
                .ok_or(ApiError::NotFound { resource: "User" })
        })
    }

    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let department = payload
                .department
                .as_ref()
                .and_then(IdRef::normalize)
                .and_then(|id| data.department(id))
                .cloned();
            let nested = payload.personal_info.clone().unwrap_or_default();
            let contact = payload.contact_info.clone().unwrap_or_default();
            let user = User {
                id: next_id(data.users.iter().map(|u| u.id)),
                username: payload.username.clone().unwrap_or_default(),
                password: Some(
                    payload
                        .password
                        .clone()
                        .unwrap_or_else(|| "password".to_string()),
                ),
                email: payload.email.clone().unwrap_or_default(),
                role: payload.role.unwrap_or(Role::Student),
                is_active: true,
                department,
                personal_info: PersonalInfo {
                    first_name: nested
                        .first_name
                        .or_else(|| payload.first_name.clone())
                        .unwrap_or_default(),
                    middle_name: nested.middle_name.unwrap_or_default(),
                    last_name: nested
                        .last_name
                        .or_else(|| payload.last_name.clone())
                        .unwrap_or_default(),
                    gender: nested
                        .gender
                        .or_else(|| payload.gender.clone())
                        .unwrap_or_else(|| "M".to_string()),
                    date_of_birth: nested.date_of_birth.or(payload.date_of_birth),
                    national_id: nested.national_id.or_else(|| payload.national_id.clone()),
                },
                contact_info: ContactInfo {
                    primary_phone: contact
                        .primary_phone
                        .or_else(|| payload.primary_phone.clone())
                        .unwrap_or_default(),
                    emergency_contact_name: contact.emergency_contact_name.unwrap_or_default(),
                    emergency_contact_phone: contact.emergency_contact_phone.unwrap_or_default(),
                    emergency_contact_relation: contact
                        .emergency_contact_relation
                        .unwrap_or_default(),
                    address: contact
                        .address
                        .or_else(|| payload.address.clone())
                        .unwrap_or_default(),
                    city: contact.city.or_else(|| payload.city.clone()).unwrap_or_default(),
                    state: contact
                        .state
                        .or_else(|| payload.state.clone())
                        .unwrap_or_default(),
                    country: contact
                        .country
                        .or_else(|| payload.country.clone())
                        .unwrap_or_default(),
                },
            };
            data.users.push(user.clone());
            Ok(data.resolved_user(&user))
        })
    }

    pub async fn update_user(&self, id: &IdRef, payload: &UserPayload) -> Result<User, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let department = payload
                .department
                .as_ref()
                .and_then(IdRef::normalize)
                .and_then(|dept_id| data.department(dept_id))
                .cloned();
            let index = data
                .users
                .iter()
                .position(|u| Some(u.id) == id)
                .ok_or(ApiError::NotFound { resource: "User" })?;

            let existing = &data.users[index];
            let nested = payload.personal_info.clone().unwrap_or_default();
            let contact = payload.contact_info.clone().unwrap_or_default();
            let mut updated = existing.clone();

            if let Some(username) = &payload.username {
                updated.username = username.clone();
            }
            if let Some(email) = &payload.email {
                updated.email = email.clone();
            }
            if let Some(role) = payload.role {
                updated.role = role;
            }
            if department.is_some() {
                updated.department = department;
            }

            let pi = &mut updated.personal_info;
            merge(&mut pi.first_name, nested.first_name.or_else(|| payload.first_name.clone()));
            merge(&mut pi.middle_name, nested.middle_name);
            merge(&mut pi.last_name, nested.last_name.or_else(|| payload.last_name.clone()));
            merge(&mut pi.gender, nested.gender.or_else(|| payload.gender.clone()));
            if nested.date_of_birth.is_some() {
                pi.date_of_birth = nested.date_of_birth;
            }
            if nested.national_id.is_some() {
                pi.national_id = nested.national_id;
            }

            let ci = &mut updated.contact_info;
            merge(
                &mut ci.primary_phone,
                contact.primary_phone.or_else(|| payload.primary_phone.clone()),
            );
            merge(&mut ci.emergency_contact_name, contact.emergency_contact_name);
            merge(&mut ci.emergency_contact_phone, contact.emergency_contact_phone);
            merge(
                &mut ci.emergency_contact_relation,
                contact.emergency_contact_relation,
            );
            merge(&mut ci.address, contact.address.or_else(|| payload.address.clone()));
            merge(&mut ci.city, contact.city.or_else(|| payload.city.clone()));
            merge(&mut ci.state, contact.state.or_else(|| payload.state.clone()));
            merge(&mut ci.country, contact.country.or_else(|| payload.country.clone()));

            data.users[index] = updated.clone();
            Ok(data.resolved_user(&updated))
        })
    }

    pub async fn delete_user(&self, id: &IdRef) -> Result<(), ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let index = data
                .users
                .iter()
                .position(|u| Some(u.id) == id)
                .ok_or(ApiError::NotFound { resource: "User" })?;
            data.users.remove(index);
            Ok(())
        })
    }

    pub async fn user_profile(&self) -> Result<User, ApiError> {
        self.current_user().await
    }

    pub async fn update_profile(&self, payload: &UserPayload) -> Result<User, ApiError> {
        let id = self
            .tokens
            .mock_user_id()
            .ok_or(ApiError::NotFound { resource: "User" })?;
        self.update_user(&IdRef::from(id), payload).await
    }

    // ---- Departments ----

    pub async fn list_departments(
        &self,
        params: &ListParams,
    ) -> Result<Listing<Department>, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let departments = search_filter(
                data.departments.clone(),
                &["name", "department_code", "code"],
                params.search.as_deref(),
            );
            Ok(paginate(departments, params))
        })
    }

    pub async fn get_department(&self, id: &IdRef) -> Result<Department, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            data.departments
                .iter()
                .find(|d| Some(d.id) == id)
                .cloned()
                .ok_or(ApiError::NotFound { resource: "Department" })
        })
    }

    pub async fn create_department(
        &self,
        payload: &DepartmentPayload,
    ) -> Result<Department, ApiError> {
        self.simulate().await;
        let name = payload.name.clone().ok_or_else(|| ApiError::Validation {
            message: "name: is required".to_string(),
        })?;
        // Default code: first 4 letters of the name, uppercased.
        let derived: String = name.chars().take(4).collect::<String>().to_uppercase();
        let code = payload
            .department_code
            .clone()
            .or_else(|| payload.code.clone())
            .unwrap_or(derived);
        let head = payload.head_faculty.as_ref().and_then(IdRef::normalize);
        self.store.with(|data| {
            let department = Department {
                id: next_id(data.departments.iter().map(|d| d.id)),
                name,
                department_code: code.clone(),
                code,
                description: payload.description.clone().unwrap_or_default(),
                is_active: payload.is_active.unwrap_or(true),
                head_faculty: head,
                head,
            };
            data.departments.push(department.clone());
            Ok(department)
        })
    }

    pub async fn update_department(
        &self,
        id: &IdRef,
        payload: &DepartmentPayload,
    ) -> Result<Department, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let index = data
                .departments
                .iter()
                .position(|d| Some(d.id) == id)
                .ok_or(ApiError::NotFound { resource: "Department" })?;
            let mut updated = data.departments[index].clone();

            merge(&mut updated.name, payload.name.clone());
            if let Some(code) = payload.department_code.clone().or_else(|| payload.code.clone()) {
                updated.department_code = code.clone();
                updated.code = code;
            }
            merge(&mut updated.description, payload.description.clone());
            if let Some(active) = payload.is_active {
                updated.is_active = active;
            }
            // Setting either alias sets both.
            let head_faculty = payload.head_faculty.as_ref().and_then(IdRef::normalize);
            let head = payload.head.as_ref().and_then(IdRef::normalize);
            if head_faculty.is_some() || head.is_some() {
                updated.head_faculty = head_faculty.or(head);
                updated.head = head.or(head_faculty);
            }

            data.departments[index] = updated.clone();
            Ok(updated)
        })
    }

    pub async fn delete_department(&self, id: &IdRef) -> Result<(), ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let index = data
                .departments
                .iter()
                .position(|d| Some(d.id) == id)
                .ok_or(ApiError::NotFound { resource: "Department" })?;
            data.departments.remove(index);
            Ok(())
        })
    }

    pub async fn department_faculty(&self, id: &IdRef) -> Result<Vec<User>, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            Ok(data
                .users
                .iter()
                .filter(|u| {
                    u.role == Role::Faculty
                        && id.is_some_and(|want| {
                            u.department.as_ref().is_some_and(|d| d.id == want)
                        })
                })
                .map(|u| data.resolved_user(u))
                .collect())
        })
    }

    pub async fn department_courses(&self, id: &IdRef) -> Result<Vec<Course>, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            Ok(data
                .courses
                .iter()
                .filter(|c| {
                    id.is_some_and(|want| c.department.as_ref().is_some_and(|d| d.id == want))
                })
                .map(|c| data.resolved_course(c))
                .collect())
        })
    }

    // ---- Academic ----

    pub async fn list_programs(&self, params: &ListParams) -> Result<Listing<Program>, ApiError> {
        self.simulate().await;
        let department = params.department_id.as_ref().and_then(IdRef::normalize);
        self.store.with(|data| {
            let programs = data
                .programs
                .iter()
                .filter(|p| department.is_none() || Some(p.department_id) == department)
                .cloned()
                .collect();
            Ok(paginate(programs, params))
        })
    }

    pub async fn create_program(&self, payload: &ProgramPayload) -> Result<Program, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let program = Program {
                id: next_id(data.programs.iter().map(|p| p.id)),
                program_code: payload.program_code.clone(),
                name: payload.name.clone(),
                department_id: payload.department_id,
                total_credits_required: payload.total_credits_required,
                minimum_gpa: payload.minimum_gpa,
                degree_level: payload.degree_level.clone(),
                is_active: payload.is_active.unwrap_or(true),
            };
            data.programs.push(program.clone());
            Ok(program)
        })
    }

    pub async fn get_program(&self, id: &IdRef) -> Result<Program, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            data.programs
                .iter()
                .find(|p| Some(p.id) == id)
                .cloned()
                .ok_or(ApiError::NotFound { resource: "Program" })
        })
    }

    pub async fn program_courses(&self, id: &IdRef) -> Result<Listing<Course>, ApiError> {
        let program = self.get_program(id).await?;
        let params = ListParams {
            department_id: Some(IdRef::from(program.department_id)),
            ..ListParams::default()
        };
        self.list_courses(&params).await
    }

    pub async fn list_courses(&self, params: &ListParams) -> Result<Listing<Course>, ApiError> {
        self.simulate().await;
        let department = params.department_id.as_ref().and_then(IdRef::normalize);
        self.store.with(|data| {
            let courses: Vec<Course> = data
                .courses
                .iter()
                .filter(|c| {
                    department.is_none() || c.department.as_ref().map(|d| d.id) == department
                })
                .map(|c| data.resolved_course(c))
                .collect();
            let courses = search_filter(
                courses,
                &["course_code", "code", "title", "department.name"],
                params.search.as_deref(),
            );
            Ok(paginate(courses, params))
        })
    }

    pub async fn get_course(&self, id: &IdRef) -> Result<Course, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            data.courses
                .iter()
                .find(|c| Some(c.id) == id)
                .map(|c| data.resolved_course(c))
                .ok_or(ApiError::NotFound { resource: "Course" })
        })
    }

    pub async fn create_course(&self, payload: &CoursePayload) -> Result<Course, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let department = payload
                .department
                .as_ref()
                .and_then(IdRef::normalize)
                .and_then(|id| data.department(id))
                .cloned();
            let prerequisites = normalize_prereqs(payload.prerequisites.as_deref());
            let code = payload.course_code.clone().unwrap_or_default();
            let credit_hours = payload.credit_hours.unwrap_or(3);
            let course = Course {
                id: next_id(data.courses.iter().map(|c| c.id)),
                course_code: code.clone(),
                code,
                title: payload.title.clone().unwrap_or_default(),
                description: payload.description.clone().unwrap_or_default(),
                credit_hours,
                credits: credit_hours,
                department_id: department.as_ref().map(|d| d.id),
                department,
                course_level: payload.course_level.unwrap_or(100),
                is_active: payload.is_active.unwrap_or(true),
                prerequisites,
            };
            data.courses.push(course.clone());
            Ok(data.resolved_course(&course))
        })
    }

    pub async fn update_course(
        &self,
        id: &IdRef,
        payload: &CoursePayload,
    ) -> Result<Course, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let department = payload
                .department
                .as_ref()
                .and_then(IdRef::normalize)
                .and_then(|dept_id| data.department(dept_id))
                .cloned();
            let index = data
                .courses
                .iter()
                .position(|c| Some(c.id) == id)
                .ok_or(ApiError::NotFound { resource: "Course" })?;
            let mut updated = data.courses[index].clone();

            if let Some(code) = &payload.course_code {
                updated.course_code = code.clone();
                updated.code = code.clone();
            }
            merge(&mut updated.title, payload.title.clone());
            merge(&mut updated.description, payload.description.clone());
            if let Some(hours) = payload.credit_hours {
                updated.credit_hours = hours;
                updated.credits = hours;
            }
            if let Some(department) = department {
                updated.department_id = Some(department.id);
                updated.department = Some(department);
            }
            if let Some(level) = payload.course_level {
                updated.course_level = level;
            }
            if let Some(active) = payload.is_active {
                updated.is_active = active;
            }
            if payload.prerequisites.is_some() {
                updated.prerequisites = normalize_prereqs(payload.prerequisites.as_deref());
            }

            data.courses[index] = updated.clone();
            Ok(data.resolved_course(&updated))
        })
    }

    /// Deletes a course and cascades to any offerings referencing it.
    pub async fn delete_course(&self, id: &IdRef) -> Result<(), ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let index = data
                .courses
                .iter()
                .position(|c| Some(c.id) == id)
                .ok_or(ApiError::NotFound { resource: "Course" })?;
            data.courses.remove(index);
            data.offerings.retain(|o| Some(o.course_id) != id);
            Ok(())
        })
    }

    pub async fn course_prerequisites(&self, id: &IdRef) -> Result<Vec<Prerequisite>, ApiError> {
        Ok(self.get_course(id).await?.prerequisites)
    }

    // ---- Enrollment ----

    pub async fn list_terms(&self, params: &ListParams) -> Result<Listing<Term>, ApiError> {
        self.simulate().await;
        self.store
            .with(|data| Ok(paginate(data.terms.clone(), params)))
    }

    pub async fn current_term(&self) -> Result<Term, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            data.terms
                .iter()
                .find(|t| t.is_current)
                .or_else(|| data.terms.first())
                .cloned()
                .ok_or(ApiError::NotFound { resource: "Term" })
        })
    }

    pub async fn list_offerings(
        &self,
        params: &ListParams,
    ) -> Result<Listing<CourseOffering>, ApiError> {
        self.simulate().await;
        let faculty = params.faculty_id.as_ref().and_then(IdRef::normalize);
        let course = params.course_id.as_ref().and_then(IdRef::normalize);
        self.store.with(|data| {
            let offerings = data
                .offerings
                .iter()
                .filter(|o| {
                    (faculty.is_none() || o.faculty.as_ref().map(|f| f.id) == faculty)
                        && (course.is_none() || Some(o.course_id) == course)
                })
                .cloned()
                .collect();
            Ok(paginate(offerings, params))
        })
    }

    pub async fn enrolled_students(&self, offering: &IdRef) -> Result<Vec<User>, ApiError> {
        self.simulate().await;
        let offering = offering.normalize();
        self.store.with(|data| {
            Ok(data
                .enrollments
                .iter()
                .filter(|e| Some(e.course_offering.id) == offering)
                .map(|e| data.resolved_user(&e.student))
                .collect())
        })
    }

    pub async fn list_enrollments(
        &self,
        params: &ListParams,
    ) -> Result<Listing<Enrollment>, ApiError> {
        self.simulate().await;
        let student = params.student.as_ref().and_then(IdRef::normalize);
        self.store.with(|data| {
            let enrollments = data
                .enrollments
                .iter()
                .filter(|e| {
                    (student.is_none() || Some(e.student.id) == student)
                        && (params.active != Some(true) || e.status == EnrollmentStatus::Active)
                })
                .cloned()
                .collect();
            Ok(paginate(enrollments, params))
        })
    }

    /// Enrollments for the current mock user (or the first seeded student).
    pub async fn my_enrollments(&self, params: &ListParams) -> Result<Listing<Enrollment>, ApiError> {
        let student = params
            .student
            .clone()
            .or_else(|| self.tokens.mock_user_id().map(IdRef::from))
            .or_else(|| {
                self.store.with(|data| {
                    data.users
                        .iter()
                        .find(|u| u.role == Role::Student)
                        .map(|u| IdRef::from(u.id))
                })
            });
        let params = ListParams {
            student,
            ..params.clone()
        };
        self.list_enrollments(&params).await
    }

    /// Creates an enrollment against the first offering found for the given
    /// course (not section-specific).
    pub async fn create_enrollment(
        &self,
        payload: &EnrollmentPayload,
    ) -> Result<Enrollment, ApiError> {
        self.simulate().await;
        let student = payload.student.as_ref().and_then(IdRef::normalize);
        let course = payload.course.as_ref().and_then(IdRef::normalize);
        self.store.with(|data| {
            let student = student
                .and_then(|id| data.users.iter().find(|u| u.id == id))
                .or_else(|| data.users.iter().find(|u| u.role == Role::Student))
                .map(|u| data.resolved_user(u))
                .ok_or(ApiError::NotFound { resource: "Student" })?;
            let offering = data
                .offerings
                .iter()
                .find(|o| Some(o.course_id) == course)
                .or_else(|| data.offerings.first())
                .cloned()
                .ok_or(ApiError::NotFound { resource: "Course offering" })?;

            let enrollment = Enrollment {
                id: next_id(data.enrollments.iter().map(|e| e.id)),
                course_offering: offering,
                student,
                enrollment_date: Utc::now(),
                status: EnrollmentStatus::Active,
            };
            data.enrollments.push(enrollment.clone());
            Ok(enrollment)
        })
    }

    pub async fn get_enrollment(&self, id: &IdRef) -> Result<Enrollment, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            data.enrollments
                .iter()
                .find(|e| Some(e.id) == id)
                .cloned()
                .ok_or(ApiError::NotFound { resource: "Enrollment" })
        })
    }

    pub async fn update_enrollment(
        &self,
        id: &IdRef,
        update: &EnrollmentUpdate,
    ) -> Result<Enrollment, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let enrollment = data
                .enrollments
                .iter_mut()
                .find(|e| Some(e.id) == id)
                .ok_or(ApiError::NotFound { resource: "Enrollment" })?;
            if let Some(status) = update.status {
                enrollment.status = status;
            }
            Ok(enrollment.clone())
        })
    }

    /// Hard removal, mirroring the documented mock contract; the real
    /// backend may flip status instead.
    pub async fn drop_enrollment(&self, id: &IdRef) -> Result<(), ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let index = data
                .enrollments
                .iter()
                .position(|e| Some(e.id) == id)
                .ok_or(ApiError::NotFound { resource: "Enrollment" })?;
            data.enrollments.remove(index);
            Ok(())
        })
    }

    // ---- Attendance ----

    pub async fn list_attendance(
        &self,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        self.simulate().await;
        self.store
            .with(|data| Ok(paginate(data.attendance.clone(), params)))
    }

    /// Attendance for the resolved identity. With no param and no stored
    /// mock user id there is nobody to match, so the listing is empty.
    pub async fn my_attendance(
        &self,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        let student = params
            .student_id
            .clone()
            .or_else(|| self.tokens.mock_user_id().map(IdRef::from));
        match student {
            Some(student) => self.student_report(&student, params).await,
            None => {
                self.simulate().await;
                Ok(paginate(Vec::new(), params))
            }
        }
    }

    pub async fn create_attendance(
        &self,
        payload: &AttendancePayload,
    ) -> Result<AttendanceRecord, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let record = AttendanceRecord {
                id: next_id(data.attendance.iter().map(|a| a.id)),
                course_offering_id: payload.course_offering_id,
                date: payload.date,
                student_id: payload.student_id,
                status: payload.status,
            };
            data.attendance.push(record.clone());
            Ok(record)
        })
    }

    /// Inserts one record per entry, stamping each with the envelope's
    /// shared offering id and date.
    pub async fn bulk_create_attendance(
        &self,
        payload: &BulkAttendance,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let mut created = Vec::with_capacity(payload.attendance_records.len());
            for entry in &payload.attendance_records {
                let record = AttendanceRecord {
                    id: next_id(data.attendance.iter().map(|a| a.id)),
                    course_offering_id: payload.course_offering_id,
                    date: payload.date,
                    student_id: entry.student_id,
                    status: entry.status,
                };
                data.attendance.push(record.clone());
                created.push(record);
            }
            Ok(created)
        })
    }

    pub async fn update_attendance(
        &self,
        id: &IdRef,
        update: &AttendanceUpdate,
    ) -> Result<AttendanceRecord, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let record = data
                .attendance
                .iter_mut()
                .find(|a| Some(a.id) == id)
                .ok_or(ApiError::NotFound { resource: "Attendance record" })?;
            if let Some(status) = update.status {
                record.status = status;
            }
            if let Some(date) = update.date {
                record.date = date;
            }
            Ok(record.clone())
        })
    }

    pub async fn student_report(
        &self,
        student: &IdRef,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        self.simulate().await;
        let student = student.normalize();
        self.store.with(|data| {
            let records = data
                .attendance
                .iter()
                .filter(|a| Some(a.student_id) == student)
                .cloned()
                .collect();
            Ok(paginate(records, params))
        })
    }

    pub async fn course_report(
        &self,
        course_offering: &IdRef,
        params: &ListParams,
    ) -> Result<Listing<AttendanceRecord>, ApiError> {
        self.simulate().await;
        let offering = course_offering.normalize();
        self.store.with(|data| {
            let records = data
                .attendance
                .iter()
                .filter(|a| Some(a.course_offering_id) == offering)
                .cloned()
                .collect();
            Ok(paginate(records, params))
        })
    }

    // ---- Grading ----

    pub async fn list_grade_components(
        &self,
        params: &ListParams,
    ) -> Result<Listing<GradeComponent>, ApiError> {
        self.simulate().await;
        let offering = params.course_offering_id.as_ref().and_then(IdRef::normalize);
        self.store.with(|data| {
            let components = data
                .grade_components
                .iter()
                .filter(|c| offering.is_none() || Some(c.course_offering_id) == offering)
                .cloned()
                .collect();
            Ok(paginate(components, params))
        })
    }

    pub async fn create_grade_component(
        &self,
        payload: &GradeComponentPayload,
    ) -> Result<GradeComponent, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let component = GradeComponent {
                id: next_id(data.grade_components.iter().map(|c| c.id)),
                course_offering_id: payload.course_offering_id,
                name: payload.name.clone(),
                weight: payload.weight,
            };
            data.grade_components.push(component.clone());
            Ok(component)
        })
    }

    /// Records one grade per entry, stamped with the envelope's component
    /// and offering ids.
    pub async fn submit_grades(&self, batch: &GradeBatch) -> Result<(), ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            for entry in &batch.grades {
                let grade = Grade {
                    id: next_id(data.grades.iter().map(|g| g.id)),
                    enrollment_id: entry.enrollment_id,
                    course_offering_id: batch.course_offering_id,
                    grade_component_id: batch.grade_component_id,
                    score: entry.score,
                    comment: entry.comment.clone(),
                };
                data.grades.push(grade);
            }
            Ok(())
        })
    }

    pub async fn course_grades(&self, offering: &IdRef) -> Result<Vec<Grade>, ApiError> {
        self.simulate().await;
        let offering = offering.normalize();
        self.store.with(|data| {
            Ok(data
                .grades
                .iter()
                .filter(|g| Some(g.course_offering_id) == offering)
                .cloned()
                .collect())
        })
    }

    pub async fn list_grades(&self, params: &ListParams) -> Result<Listing<Grade>, ApiError> {
        self.simulate().await;
        self.store
            .with(|data| Ok(paginate(data.grades.clone(), params)))
    }

    pub async fn submit_grade(&self, payload: &GradePayload) -> Result<Grade, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let grade = Grade {
                id: next_id(data.grades.iter().map(|g| g.id)),
                enrollment_id: payload.enrollment_id,
                course_offering_id: payload.course_offering_id,
                grade_component_id: payload.grade_component_id,
                score: payload.score,
                comment: payload.comment.clone(),
            };
            data.grades.push(grade.clone());
            Ok(grade)
        })
    }

    pub async fn update_grade(&self, id: &IdRef, update: &GradeUpdate) -> Result<Grade, ApiError> {
        self.simulate().await;
        let id = id.normalize();
        self.store.with(|data| {
            let grade = data
                .grades
                .iter_mut()
                .find(|g| Some(g.id) == id)
                .ok_or(ApiError::NotFound { resource: "Grade" })?;
            if let Some(score) = update.score {
                grade.score = score;
            }
            if update.comment.is_some() {
                grade.comment = update.comment.clone();
            }
            Ok(grade.clone())
        })
    }

    pub async fn student_grades(
        &self,
        student: &IdRef,
        params: &ListParams,
    ) -> Result<Listing<Grade>, ApiError> {
        self.simulate().await;
        let student = student.normalize();
        self.store.with(|data| {
            let enrollment_ids: Vec<i64> = data
                .enrollments
                .iter()
                .filter(|e| Some(e.student.id) == student)
                .map(|e| e.id)
                .collect();
            let grades = data
                .grades
                .iter()
                .filter(|g| enrollment_ids.contains(&g.enrollment_id))
                .cloned()
                .collect();
            Ok(paginate(grades, params))
        })
    }

    pub async fn academic_records(
        &self,
        params: &ListParams,
    ) -> Result<Listing<AcademicRecord>, ApiError> {
        self.simulate().await;
        self.store.with(|data| {
            let records = data
                .enrollments
                .iter()
                .map(|e| AcademicRecord {
                    student_id: e.student.id,
                    term: e
                        .course_offering
                        .term
                        .as_ref()
                        .map(|t| t.name.clone())
                        .unwrap_or_default(),
                    course: e
                        .course_offering
                        .course
                        .as_ref()
                        .map(|c| c.course_code.clone())
                        .unwrap_or_default(),
                    status: e.status,
                })
                .collect();
            Ok(paginate(records, params))
        })
    }

    /// Placeholder GPA: the presence of any grade yields a fixed value. The
    /// real backend computes a weighted average; do not treat this as the
    /// reference algorithm.
    pub async fn calculate_gpa(&self, student: &IdRef) -> Result<GpaSummary, ApiError> {
        let grades = self.student_grades(student, &ListParams::default()).await?;
        let gpa = if grades.is_empty() { 0.0 } else { 3.4 };
        Ok(GpaSummary { gpa })
    }
}

/// Replaces `target` when the payload supplied a value.
fn merge(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn normalize_prereqs(inputs: Option<&[PrereqInput]>) -> Vec<Prerequisite> {
    inputs
        .unwrap_or_default()
        .iter()
        .filter_map(PrereqInput::normalize)
        .collect()
}
