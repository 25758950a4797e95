//! Development seed data for the mock backend.

use super::store::MockData;
use crate::models::*;
use chrono::{NaiveDate, TimeZone, Utc};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid seed date")
}

fn departments() -> Vec<Department> {
    let dept = |id, name: &str, code: &str, description: &str, head_faculty| Department {
        id,
        name: name.to_string(),
        department_code: code.to_string(),
        code: code.to_string(),
        description: description.to_string(),
        is_active: true,
        head_faculty,
        head: head_faculty,
    };
    vec![
        dept(
            1,
            "Computer Science",
            "CS",
            "Software engineering, data science, and AI programs.",
            Some(2),
        ),
        dept(2, "Mathematics", "MATH", "Applied and pure mathematics.", None),
        dept(3, "Physics", "PHYS", "Physics and astronomy.", Some(3)),
        dept(4, "Business", "BUS", "Management and finance.", None),
    ]
}

#[allow(clippy::too_many_arguments)]
fn user(
    id: i64,
    username: &str,
    password: &str,
    email: &str,
    role: Role,
    department: Option<Department>,
    personal: PersonalInfo,
    contact: ContactInfo,
) -> User {
    User {
        id,
        username: username.to_string(),
        password: Some(password.to_string()),
        email: email.to_string(),
        role,
        is_active: true,
        department,
        personal_info: personal,
        contact_info: contact,
    }
}

fn personal(
    first: &str,
    middle: &str,
    last: &str,
    gender: &str,
    born: NaiveDate,
    national_id: &str,
) -> PersonalInfo {
    PersonalInfo {
        first_name: first.to_string(),
        middle_name: middle.to_string(),
        last_name: last.to_string(),
        gender: gender.to_string(),
        date_of_birth: Some(born),
        national_id: Some(national_id.to_string()),
    }
}

fn contact(phone: &str, contact_name: &str, contact_phone: &str, relation: &str, address: &str) -> ContactInfo {
    ContactInfo {
        primary_phone: phone.to_string(),
        emergency_contact_name: contact_name.to_string(),
        emergency_contact_phone: contact_phone.to_string(),
        emergency_contact_relation: relation.to_string(),
        address: address.to_string(),
        city: "Doha".to_string(),
        state: String::new(),
        country: "Qatar".to_string(),
    }
}

fn users(departments: &[Department]) -> Vec<User> {
    vec![
        user(
            1,
            "admin",
            "admin123",
            "admin@sis.test",
            Role::Admin,
            Some(departments[0].clone()),
            personal("Amina", "", "Rahman", "F", date(1985, 6, 12), "ADM001"),
            contact(
                "+974-5555-1000",
                "Kareem Rahman",
                "+974-5555-1001",
                "Spouse",
                "123 Admin St",
            ),
        ),
        user(
            2,
            "faculty",
            "password",
            "omar.saleh@sis.test",
            Role::Faculty,
            Some(departments[0].clone()),
            personal("Omar", "Youssef", "Saleh", "M", date(1978, 9, 5), "FAC145"),
            contact(
                "+974-5555-2000",
                "Leila Saleh",
                "+974-5555-2001",
                "Spouse",
                "45 Faculty Ave",
            ),
        ),
        user(
            3,
            "physics",
            "password",
            "sarah.najib@sis.test",
            Role::Faculty,
            Some(departments[2].clone()),
            personal("Sarah", "K.", "Najib", "F", date(1982, 11, 20), "FAC199"),
            contact(
                "+974-5555-2100",
                "Omar Najib",
                "+974-5555-2101",
                "Spouse",
                "12 Crescent Rd",
            ),
        ),
        user(
            4,
            "student",
            "password",
            "layla.yousef@sis.test",
            Role::Student,
            Some(departments[0].clone()),
            personal("Layla", "", "Yousef", "F", date(2004, 4, 15), "STU3001"),
            contact(
                "+974-5555-3001",
                "Hassan Yousef",
                "+974-5555-3002",
                "Father",
                "321 Student Rd",
            ),
        ),
        user(
            5,
            "student2",
            "password",
            "omar.ramzi@sis.test",
            Role::Student,
            Some(departments[1].clone()),
            personal("Omar", "", "Ramzi", "M", date(2003, 12, 1), "STU3002"),
            contact(
                "+974-5555-3003",
                "Samir Ramzi",
                "+974-5555-3004",
                "Father",
                "54 Student Ln",
            ),
        ),
        user(
            6,
            "student3",
            "password",
            "sara.mansour@sis.test",
            Role::Student,
            Some(departments[3].clone()),
            personal("Sara", "Ali", "Mansour", "F", date(2004, 2, 22), "STU3003"),
            contact(
                "+974-5555-3005",
                "Mona Mansour",
                "+974-5555-3006",
                "Mother",
                "99 Market St",
            ),
        ),
    ]
}

fn programs() -> Vec<Program> {
    vec![
        Program {
            id: 1,
            program_code: "BSCS".to_string(),
            name: "B.Sc. Computer Science".to_string(),
            department_id: 1,
            total_credits_required: 120,
            minimum_gpa: 2.5,
            degree_level: "bachelor".to_string(),
            is_active: true,
        },
        Program {
            id: 2,
            program_code: "BSMATH".to_string(),
            name: "B.Sc. Mathematics".to_string(),
            department_id: 2,
            total_credits_required: 120,
            minimum_gpa: 2.5,
            degree_level: "bachelor".to_string(),
            is_active: true,
        },
    ]
}

fn courses(departments: &[Department]) -> Vec<Course> {
    let course = |id,
                  code: &str,
                  title: &str,
                  description: &str,
                  credit_hours,
                  department: &Department,
                  course_level,
                  prerequisites: Vec<Prerequisite>| Course {
        id,
        course_code: code.to_string(),
        code: code.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        credit_hours,
        credits: credit_hours,
        department: Some(department.clone()),
        department_id: Some(department.id),
        course_level,
        is_active: true,
        prerequisites,
    };
    vec![
        course(
            1,
            "CS101",
            "Introduction to Programming",
            "Fundamentals of programming using Python.",
            3,
            &departments[0],
            100,
            vec![],
        ),
        course(
            2,
            "CS201",
            "Data Structures",
            "Core data structures and algorithms.",
            3,
            &departments[0],
            200,
            vec![Prerequisite {
                required_course: 1,
                minimum_grade: 2.0,
            }],
        ),
        course(
            3,
            "CS301",
            "Algorithms",
            "Algorithm design and analysis.",
            3,
            &departments[0],
            300,
            vec![Prerequisite {
                required_course: 2,
                minimum_grade: 2.0,
            }],
        ),
        course(
            4,
            "MATH201",
            "Linear Algebra",
            "Matrices, vectors, and linear transformations.",
            4,
            &departments[1],
            200,
            vec![],
        ),
        course(
            5,
            "BUS101",
            "Principles of Management",
            "Foundations of business management and leadership.",
            3,
            &departments[3],
            100,
            vec![],
        ),
    ]
}

fn terms() -> Vec<Term> {
    vec![
        Term {
            id: 1,
            name: "Spring 2025".to_string(),
            start_date: date(2025, 1, 10),
            end_date: date(2025, 5, 20),
            is_current: true,
        },
        Term {
            id: 2,
            name: "Fall 2024".to_string(),
            start_date: date(2024, 8, 20),
            end_date: date(2024, 12, 15),
            is_current: false,
        },
    ]
}

fn offerings(courses: &[Course], terms: &[Term], users: &[User]) -> Vec<CourseOffering> {
    let offering = |id, course: &Course, faculty: &User, section: &str, capacity, schedule: &str, room: &str| {
        CourseOffering {
            id,
            course_id: course.id,
            course: Some(course.clone()),
            term: Some(terms[0].clone()),
            faculty: Some(faculty.clone()),
            section_number: section.to_string(),
            capacity,
            schedule: schedule.to_string(),
            room: room.to_string(),
            status: OfferingStatus::Open,
        }
    };
    vec![
        offering(1, &courses[1], &users[1], "A", 35, "Mon/Wed 10:00 - 11:15", "Room 201"),
        offering(2, &courses[2], &users[1], "B", 30, "Tue/Thu 12:00 - 13:15", "Room 305"),
        offering(3, &courses[3], &users[2], "A", 40, "Tue/Thu 09:00 - 10:15", "Room 110"),
    ]
}

fn enrollments(offerings: &[CourseOffering], users: &[User]) -> Vec<Enrollment> {
    let enrolled = |id, offering: &CourseOffering, student: &User, y, m, d| Enrollment {
        id,
        course_offering: offering.clone(),
        student: student.clone(),
        enrollment_date: Utc
            .with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .expect("valid seed datetime"),
        status: EnrollmentStatus::Active,
    };
    vec![
        enrolled(1, &offerings[0], &users[3], 2025, 1, 22),
        enrolled(2, &offerings[1], &users[3], 2025, 1, 23),
        enrolled(3, &offerings[2], &users[4], 2025, 1, 25),
    ]
}

fn grade_components() -> Vec<GradeComponent> {
    let component = |id, course_offering_id, name: &str, weight| GradeComponent {
        id,
        course_offering_id,
        name: name.to_string(),
        weight,
    };
    vec![
        component(1, 1, "Midterm Exam", 30.0),
        component(2, 1, "Final Exam", 40.0),
        component(3, 2, "Project", 35.0),
    ]
}

fn grades() -> Vec<Grade> {
    let grade = |id, enrollment_id, course_offering_id, grade_component_id, score, comment: &str| Grade {
        id,
        enrollment_id,
        course_offering_id,
        grade_component_id,
        score,
        comment: Some(comment.to_string()),
    };
    vec![
        grade(1, 1, 1, 1, 88.0, "Great work on problem solving."),
        grade(2, 1, 1, 2, 91.0, "Excellent final exam."),
        grade(3, 2, 2, 3, 84.0, "Solid project implementation."),
    ]
}

/// Builds the full seeded data set.
pub fn seed_data() -> MockData {
    let departments = departments();
    let users = users(&departments);
    let courses = courses(&departments);
    let terms = terms();
    let offerings = offerings(&courses, &terms, &users);
    let enrollments = enrollments(&offerings, &users);
    MockData {
        programs: programs(),
        grade_components: grade_components(),
        grades: grades(),
        attendance: Vec::new(),
        users,
        departments,
        courses,
        terms,
        offerings,
        enrollments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_internally_consistent() {
        let data = seed_data();
        assert_eq!(data.users.len(), 6);
        assert_eq!(data.departments.len(), 4);
        assert_eq!(data.courses.len(), 5);
        assert_eq!(data.offerings.len(), 3);

        // Offerings must reference seeded courses.
        for offering in &data.offerings {
            assert!(data.courses.iter().any(|c| c.id == offering.course_id));
        }
        // Department heads must be seeded faculty users.
        for dept in &data.departments {
            if let Some(head) = dept.head_faculty {
                let user = data.users.iter().find(|u| u.id == head).unwrap();
                assert_eq!(user.role, Role::Faculty);
            }
        }
    }
}
