//! Behavior of the mock backend through the public client surface.

use chrono::NaiveDate;
use sisclient::models::*;
use sisclient::{ApiConfig, ApiError, ApiMode, SisClient};
use std::time::Duration;

/// Mock client with latency disabled; each call gets its own seeded store.
fn mock_client() -> SisClient {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = ApiConfig {
        mock_latency: Duration::ZERO,
        ..ApiConfig::mock()
    };
    SisClient::new(&config).unwrap()
}

#[tokio::test]
async fn login_persists_tokens_and_mock_identity() {
    let client = mock_client();
    assert_eq!(client.mode(), ApiMode::Mock);

    let user = client.auth().login("student", "password").await.unwrap();
    assert_eq!(user.id, 4);
    assert_eq!(user.personal_info.first_name, "Layla");

    let tokens = client.token_store();
    assert_eq!(tokens.access_token().as_deref(), Some("mock-access-4"));
    assert_eq!(tokens.refresh_token().as_deref(), Some("mock-refresh-4"));
    assert_eq!(tokens.mock_user_id(), Some(4));
    assert!(client.auth().is_authenticated());

    let current = client.auth().current_user().await.unwrap();
    assert_eq!(current.id, 4);

    client.auth().logout();
    assert!(!client.auth().is_authenticated());
    assert_eq!(tokens.mock_user_id(), None);
}

#[tokio::test]
async fn login_rejects_unknown_user_and_wrong_password() {
    let client = mock_client();
    let err = client.auth().login("nobody", "password").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));

    let err = client.auth().login("student", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid username or password");
}

#[tokio::test]
async fn refresh_preserves_the_encoded_identity() {
    let client = mock_client();
    client.auth().login("student", "password").await.unwrap();

    let token = client.auth().refresh().await.unwrap();
    assert_eq!(token.access, "mock-access-4");
}

#[tokio::test]
async fn user_listing_filters_by_role_and_searches_nested_fields() {
    let client = mock_client();

    let faculty = client
        .users()
        .list(&ListParams {
            role: Some(Role::Faculty),
            ..ListParams::default()
        })
        .await
        .unwrap();
    assert_eq!(faculty.len(), 2);

    let hits = client.users().list(&ListParams::search("LAY")).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits.items()[0].username, "student");
}

#[tokio::test]
async fn pagination_envelope_appears_only_when_requested() {
    let client = mock_client();

    let plain = client.users().list(&ListParams::default()).await.unwrap();
    assert!(matches!(plain, Listing::Plain(_)));
    assert_eq!(plain.len(), 6);

    let paged = client.users().list(&ListParams::paged(2, 4)).await.unwrap();
    match paged {
        Listing::Paged(page) => {
            assert_eq!(page.count, 6);
            assert_eq!(page.results.len(), 2);
            assert_eq!(page.page, 2);
        }
        Listing::Plain(_) => panic!("expected paged envelope"),
    }
}

#[tokio::test]
async fn string_and_integer_ids_address_the_same_record() {
    let client = mock_client();
    let by_int = client.users().get(3).await.unwrap();
    let by_string = client.users().get("3").await.unwrap();
    assert_eq!(by_int.id, by_string.id);
    assert_eq!(by_int.username, "physics");

    let err = client.users().get("nope").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn created_users_get_max_plus_one_ids_and_defaults() {
    let client = mock_client();
    let created = client
        .users()
        .create(&UserPayload {
            username: Some("newcomer".to_string()),
            email: Some("newcomer@sis.test".to_string()),
            first_name: Some("Nadia".to_string()),
            last_name: Some("Haddad".to_string()),
            ..UserPayload::default()
        })
        .await
        .unwrap();

    assert_eq!(created.id, 7);
    assert_eq!(created.role, Role::Student);
    assert_eq!(created.password.as_deref(), Some("password"));
    assert_eq!(created.personal_info.first_name, "Nadia");
    assert_eq!(created.personal_info.gender, "M");
}

#[tokio::test]
async fn returned_records_are_isolated_copies() {
    let client = mock_client();
    let mut course = client.academic().course(1).await.unwrap();
    course.title = "Mutated".to_string();

    let fetched = client.academic().course(1).await.unwrap();
    assert_eq!(fetched.title, "Introduction to Programming");
}

#[tokio::test]
async fn department_code_is_derived_from_the_name() {
    let client = mock_client();
    let created = client
        .departments()
        .create(&DepartmentPayload {
            name: Some("Engineering".to_string()),
            ..DepartmentPayload::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, 5);
    assert_eq!(created.department_code, "ENGI");
    assert_eq!(created.code, "ENGI");

    let err = client
        .departments()
        .create(&DepartmentPayload::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "name: is required");
}

#[tokio::test]
async fn department_head_aliases_stay_in_sync() {
    let client = mock_client();
    let updated = client
        .departments()
        .update(
            2,
            &DepartmentPayload {
                head: Some(IdRef::from(3)),
                ..DepartmentPayload::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.head_faculty, Some(3));
    assert_eq!(updated.head, Some(3));
}

#[tokio::test]
async fn deleting_a_course_cascades_to_its_offerings() {
    let client = mock_client();
    let before = client
        .enrollment()
        .offerings(&ListParams::default())
        .await
        .unwrap();
    assert_eq!(before.len(), 3);

    client.academic().delete_course(2).await.unwrap();

    let after = client
        .enrollment()
        .offerings(&ListParams::default())
        .await
        .unwrap();
    assert_eq!(after.len(), 2);
    assert!(after.items().iter().all(|o| o.course_id != 2));
}

#[tokio::test]
async fn course_creation_normalizes_prerequisite_shapes() {
    let client = mock_client();
    let created = client
        .academic()
        .create_course(&CoursePayload {
            course_code: Some("CS401".to_string()),
            title: Some("Compilers".to_string()),
            department: Some(IdRef::from(1)),
            prerequisites: Some(vec![
                PrereqInput::Bare(IdRef::from("3")),
                PrereqInput::Entry {
                    required_course: IdRef::from(2),
                    minimum_grade: Some(2.5),
                },
            ]),
            ..CoursePayload::default()
        })
        .await
        .unwrap();

    assert_eq!(created.id, 6);
    assert_eq!(created.credit_hours, 3);
    assert_eq!(created.course_level, 100);
    assert_eq!(
        created.prerequisites,
        vec![
            Prerequisite {
                required_course: 3,
                minimum_grade: 2.0
            },
            Prerequisite {
                required_course: 2,
                minimum_grade: 2.5
            },
        ]
    );
}

#[tokio::test]
async fn course_search_matches_the_embedded_department_name() {
    let client = mock_client();
    let hits = client
        .academic()
        .courses(&ListParams::search("comput"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.items().iter().all(|c| c.course_code.starts_with("CS")));
}

#[tokio::test]
async fn enrollment_defaults_resolve_student_and_offering() {
    let client = mock_client();
    client.auth().login("student", "password").await.unwrap();

    let enrollment = client
        .enrollment()
        .enroll(&EnrollmentPayload {
            student: None,
            course: Some(IdRef::from(4)),
        })
        .await
        .unwrap();

    assert_eq!(enrollment.id, 4);
    assert_eq!(enrollment.student.role, Role::Student);
    assert_eq!(enrollment.course_offering.course_id, 4);
    assert_eq!(enrollment.status, EnrollmentStatus::Active);
}

#[tokio::test]
async fn my_enrollments_resolve_the_logged_in_student() {
    let client = mock_client();
    client.auth().login("student", "password").await.unwrap();

    let mine = client
        .enrollment()
        .my_enrollments(&ListParams::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.items().iter().all(|e| e.student.id == 4));
}

#[tokio::test]
async fn dropping_an_enrollment_removes_it() {
    let client = mock_client();
    client.enrollment().drop(1).await.unwrap();

    let remaining = client
        .enrollment()
        .enrollments(&ListParams::default())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 2);

    let err = client.enrollment().get(1).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn my_attendance_is_empty_without_an_identity() {
    let client = mock_client();
    let date = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
    client
        .attendance()
        .record(&AttendancePayload {
            course_offering_id: 1,
            date,
            student_id: 4,
            status: AttendanceStatus::Present,
        })
        .await
        .unwrap();

    // Nobody is logged in and no student filter was given; records exist
    // but none can belong to the caller.
    let mine = client.attendance().mine(&ListParams::default()).await.unwrap();
    assert!(mine.is_empty());

    client.auth().login("student", "password").await.unwrap();
    let mine = client.attendance().mine(&ListParams::default()).await.unwrap();
    assert_eq!(mine.len(), 1);
}

#[tokio::test]
async fn bulk_attendance_stamps_the_shared_envelope() {
    let client = mock_client();
    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let created = client
        .attendance()
        .record_bulk(&BulkAttendance {
            course_offering_id: 1,
            date,
            attendance_records: vec![
                BulkAttendanceEntry {
                    student_id: 4,
                    status: AttendanceStatus::Present,
                },
                BulkAttendanceEntry {
                    student_id: 5,
                    status: AttendanceStatus::Absent,
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].id, 1);
    assert_eq!(created[1].id, 2);
    assert!(created.iter().all(|r| r.course_offering_id == 1));
    assert!(created.iter().all(|r| r.date == date));

    let report = client
        .attendance()
        .course_report(1, &ListParams::default())
        .await
        .unwrap();
    assert_eq!(report.len(), 2);
}

#[tokio::test]
async fn grade_batches_are_stamped_and_queryable() {
    let client = mock_client();
    client
        .grading()
        .submit_batch(&GradeBatch {
            course_offering_id: 3,
            grade_component_id: 1,
            grades: vec![
                GradeEntry {
                    enrollment_id: 3,
                    score: 77.5,
                    comment: None,
                },
                GradeEntry {
                    enrollment_id: 3,
                    score: 81.0,
                    comment: Some("Improved".to_string()),
                },
            ],
        })
        .await
        .unwrap();

    let grades = client.grading().course_grades(3).await.unwrap();
    assert_eq!(grades.len(), 2);
    assert!(grades.iter().all(|g| g.course_offering_id == 3));
}

#[tokio::test]
async fn gpa_is_a_fixed_placeholder_when_grades_exist() {
    let client = mock_client();

    let with_grades = client.grading().calculate_gpa(4).await.unwrap();
    assert_eq!(with_grades.gpa, 3.4);

    let without = client.grading().calculate_gpa(6).await.unwrap();
    assert_eq!(without.gpa, 0.0);
}

#[tokio::test]
async fn academic_records_project_enrollments() {
    let client = mock_client();
    let records = client
        .grading()
        .academic_records(&ListParams::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    let first = &records.items()[0];
    assert_eq!(first.student_id, 4);
    assert_eq!(first.term, "Spring 2025");
    assert_eq!(first.course, "CS201");
}

#[tokio::test]
async fn seeded_stores_are_independent_between_clients() {
    let first = mock_client();
    let second = mock_client();

    first
        .users()
        .create(&UserPayload {
            username: Some("only-here".to_string()),
            ..UserPayload::default()
        })
        .await
        .unwrap();

    assert_eq!(first.users().list(&ListParams::default()).await.unwrap().len(), 7);
    assert_eq!(second.users().list(&ListParams::default()).await.unwrap().len(), 6);
}

#[tokio::test]
async fn department_update_is_reflected_in_embedded_references() {
    let client = mock_client();
    client
        .departments()
        .update(
            1,
            &DepartmentPayload {
                name: Some("Computing".to_string()),
                ..DepartmentPayload::default()
            },
        )
        .await
        .unwrap();

    // Reads re-resolve embedded departments against current store state.
    let user = client.users().get(2).await.unwrap();
    assert_eq!(user.department.unwrap().name, "Computing");
    let course = client.academic().course(1).await.unwrap();
    assert_eq!(course.department.unwrap().name, "Computing");
}
