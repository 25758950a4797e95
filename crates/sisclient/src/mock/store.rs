//! In-memory relational store backing the mock backend.
//!
//! All collections live behind one mutex; operations lock only for the
//! duration of the read or write, and simulated latency happens outside the
//! lock. Stores are plain values so tests can instantiate isolated ones.

use crate::models::*;
use serde::Serialize;
use serde_json::Value;
use std::sync::Mutex;

/// Every collection emulated by the mock service.
#[derive(Debug, Default)]
pub struct MockData {
    pub users: Vec<User>,
    pub departments: Vec<Department>,
    pub programs: Vec<Program>,
    pub courses: Vec<Course>,
    pub terms: Vec<Term>,
    pub offerings: Vec<CourseOffering>,
    pub enrollments: Vec<Enrollment>,
    pub attendance: Vec<AttendanceRecord>,
    pub grade_components: Vec<GradeComponent>,
    pub grades: Vec<Grade>,
}

impl MockData {
    pub fn department(&self, id: i64) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    /// Re-embeds the user's department from current store state.
    pub fn resolved_user(&self, user: &User) -> User {
        let mut user = user.clone();
        if let Some(dept) = &user.department {
            if let Some(current) = self.department(dept.id) {
                user.department = Some(current.clone());
            }
        }
        user
    }

    /// Re-embeds the course's department from current store state.
    pub fn resolved_course(&self, course: &Course) -> Course {
        let mut course = course.clone();
        let dept_id = course.department_id.or(course.department.as_ref().map(|d| d.id));
        if let Some(id) = dept_id {
            if let Some(current) = self.department(id) {
                course.department = Some(current.clone());
                course.department_id = Some(id);
            }
        }
        course
    }
}

/// Thread-safe wrapper handed to the mock backend.
pub struct MockStore {
    data: Mutex<MockData>,
}

impl MockStore {
    /// A store with no records at all.
    pub fn empty() -> Self {
        Self {
            data: Mutex::new(MockData::default()),
        }
    }

    /// A store populated with the development seed data.
    pub fn seeded() -> Self {
        Self {
            data: Mutex::new(super::seed::seed_data()),
        }
    }

    /// Runs `f` with exclusive access to the collections.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut MockData) -> R) -> R {
        let mut data = self.data.lock().expect("mock store lock poisoned");
        f(&mut data)
    }
}

/// Assigns the next record id: `max(existing) + 1`, or 1 when empty.
pub(crate) fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().map_or(1, |max| max + 1)
}

/// Wraps `items` in a page envelope when the caller asked for pagination,
/// otherwise returns the list unchanged.
pub(crate) fn paginate<T>(items: Vec<T>, params: &ListParams) -> Listing<T> {
    if params.page.is_none() && params.page_size.is_none() {
        return Listing::Plain(items);
    }
    let count = items.len();
    let page = params.page.unwrap_or(1).max(1) as usize;
    let page_size = params
        .page_size
        .map(|s| s as usize)
        .unwrap_or_else(|| count.max(1));
    let results = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Listing::Paged(Page {
        results,
        count,
        page,
        page_size,
    })
}

/// Case-insensitive substring search over an allow-list of fields.
///
/// Field names may be dotted paths into nested objects; missing or
/// non-string values never match. An empty term keeps every item.
pub(crate) fn search_filter<T: Serialize>(
    items: Vec<T>,
    fields: &[&str],
    term: Option<&str>,
) -> Vec<T> {
    let Some(term) = term.filter(|t| !t.is_empty()) else {
        return items;
    };
    let lowered = term.to_lowercase();
    items
        .into_iter()
        .filter(|item| {
            let Ok(value) = serde_json::to_value(item) else {
                return false;
            };
            fields.iter().any(|field| {
                value_at_path(&value, field)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(&lowered))
            })
        })
        .collect()
}

/// Walks a dotted path (`personal_info.first_name`) into a JSON value.
fn value_at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |value, key| value.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_id_is_monotonic_over_sparse_ids() {
        assert_eq!(next_id([4i64, 10].into_iter()), 11);
        assert_eq!(next_id(std::iter::empty()), 1);
    }

    #[test]
    fn paginate_without_params_returns_plain_list() {
        let items: Vec<i64> = (1..=10).collect();
        let listing = paginate(items.clone(), &ListParams::default());
        match listing {
            Listing::Plain(plain) => assert_eq!(plain, items),
            Listing::Paged(_) => panic!("expected plain list without page params"),
        }
    }

    #[test]
    fn paginate_slices_the_requested_page() {
        let items: Vec<i64> = (1..=10).collect();
        let listing = paginate(items, &ListParams::paged(2, 3));
        match listing {
            Listing::Paged(page) => {
                assert_eq!(page.results, vec![4, 5, 6]);
                assert_eq!(page.count, 10);
                assert_eq!(page.page, 2);
                assert_eq!(page.page_size, 3);
            }
            Listing::Plain(_) => panic!("expected paged shape"),
        }
    }

    #[test]
    fn paginate_with_only_page_size_defaults_to_first_page() {
        let items: Vec<i64> = (1..=5).collect();
        let listing = paginate(
            items,
            &ListParams {
                page_size: Some(2),
                ..ListParams::default()
            },
        );
        match listing {
            Listing::Paged(page) => assert_eq!(page.results, vec![1, 2]),
            Listing::Plain(_) => panic!("expected paged shape"),
        }
    }

    #[test]
    fn search_matches_dotted_paths_case_insensitively() {
        let items = vec![
            json!({ "username": "admin", "personal_info": { "first_name": "Amina" } }),
            json!({ "username": "student", "personal_info": { "first_name": "Layla" } }),
            json!({ "username": "nameless", "personal_info": {} }),
        ];
        let hits = search_filter(
            items,
            &["username", "personal_info.first_name"],
            Some("LAY"),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["username"], "student");
    }

    #[test]
    fn search_ignores_non_string_values() {
        let items = vec![json!({ "id": 42 })];
        assert!(search_filter(items, &["id"], Some("42")).is_empty());
    }
}
