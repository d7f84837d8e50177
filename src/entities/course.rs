// 📚 Course Entity + Registry
//
// A Course is only ever produced by `CourseBuilder::build`, which refuses to
// fill in credits, instructor, semester or department by default.
// The registry is the single owner of every course and hands out copies.

use crate::entities::grade::Semester;
use crate::error::{require_non_empty, RecordsError};
use crate::sorting::CourseOrder;
use crate::values::CourseIdentifier;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

// ============================================================================
// COURSE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    code: CourseIdentifier,
    title: String,
    credits: u32,
    instructor: String,
    semester: Semester,
    department: String,
    created_on: NaiveDate,
    active: bool,
}

impl Course {
    /// Start building a course; code and title are mandatory.
    pub fn builder(code: CourseIdentifier, title: &str) -> CourseBuilder {
        CourseBuilder::new(code, title)
    }

    pub fn code(&self) -> &CourseIdentifier {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn credits(&self) -> u32 {
        self.credits
    }

    pub fn instructor(&self) -> &str {
        &self.instructor
    }

    pub fn semester(&self) -> Semester {
        self.semester
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), RecordsError> {
        self.title = require_non_empty("title", title)?;
        Ok(())
    }

    pub fn set_credits(&mut self, credits: i32) -> Result<(), RecordsError> {
        self.credits = positive_credits(credits)?;
        Ok(())
    }

    pub fn set_instructor(&mut self, instructor: &str) -> Result<(), RecordsError> {
        self.instructor = require_non_empty("instructor", instructor)?;
        Ok(())
    }

    pub fn set_semester(&mut self, semester: Semester) {
        self.semester = semester;
    }

    pub fn set_department(&mut self, department: &str) -> Result<(), RecordsError> {
        self.department = require_non_empty("department", department)?;
        Ok(())
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Keep a creation date recorded elsewhere (CSV import).
    pub fn with_created_on(mut self, date: NaiveDate) -> Self {
        self.created_on = date;
        self
    }

    /// Case-insensitive substring match over title, code, instructor and department.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [
            self.title.as_str(),
            self.code.as_str(),
            self.instructor.as_str(),
            self.department.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

fn positive_credits(credits: i32) -> Result<u32, RecordsError> {
    if credits <= 0 {
        return Err(RecordsError::validation(
            "credits",
            format!("must be positive, got {}", credits),
        ));
    }
    Ok(credits as u32)
}

// ============================================================================
// COURSE BUILDER
// ============================================================================

/// Staged construction for `Course`.
///
/// Every setter is infallible; all checks run in `build`.
#[derive(Debug, Clone)]
pub struct CourseBuilder {
    code: CourseIdentifier,
    title: String,
    credits: Option<i32>,
    instructor: Option<String>,
    semester: Option<Semester>,
    department: Option<String>,
}

impl CourseBuilder {
    pub fn new(code: CourseIdentifier, title: &str) -> Self {
        CourseBuilder {
            code,
            title: title.to_string(),
            credits: None,
            instructor: None,
            semester: None,
            department: None,
        }
    }

    pub fn credits(mut self, credits: i32) -> Self {
        self.credits = Some(credits);
        self
    }

    pub fn instructor(mut self, instructor: &str) -> Self {
        self.instructor = Some(instructor.to_string());
        self
    }

    pub fn semester(mut self, semester: Semester) -> Self {
        self.semester = Some(semester);
        self
    }

    pub fn department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    pub fn build(self) -> Result<Course, RecordsError> {
        let title = require_non_empty("title", &self.title)?;
        let credits = positive_credits(
            self.credits
                .ok_or_else(|| RecordsError::validation("credits", "is required"))?,
        )?;
        let instructor = self
            .instructor
            .ok_or_else(|| RecordsError::validation("instructor", "is required"))?;
        let semester = self
            .semester
            .ok_or_else(|| RecordsError::validation("semester", "is required"))?;
        let department = self
            .department
            .ok_or_else(|| RecordsError::validation("department", "is required"))?;

        Ok(Course {
            code: self.code,
            title,
            credits,
            instructor: require_non_empty("instructor", &instructor)?,
            semester,
            department: require_non_empty("department", &department)?,
            created_on: Utc::now().date_naive(),
            active: true,
        })
    }
}

// ============================================================================
// COURSE REGISTRY
// ============================================================================

#[derive(Debug, Default)]
struct CourseStore {
    /// Insertion order
    courses: Vec<Course>,
    by_code: HashMap<CourseIdentifier, usize>,
}

/// Registry of all courses, unique by code.
///
/// One lock guards the whole store. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct CourseRegistry {
    store: Arc<RwLock<CourseStore>>,
}

impl CourseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CourseStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CourseStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, course: Course) -> Result<(), RecordsError> {
        let mut store = self.write();
        if store.by_code.contains_key(course.code()) {
            return Err(RecordsError::duplicate("Course", "code", course.code().as_str()));
        }

        debug!(code = %course.code(), title = course.title(), "course added");
        let index = store.courses.len();
        store.by_code.insert(course.code().clone(), index);
        store.courses.push(course);
        Ok(())
    }

    /// Look up by code; the code is normalized first, so "cs101" finds CS101.
    pub fn find_by_id(&self, code: &str) -> Option<Course> {
        let code = CourseIdentifier::new(code).ok()?;
        self.get(&code)
    }

    pub fn get(&self, code: &CourseIdentifier) -> Option<Course> {
        let store = self.read();
        store
            .by_code
            .get(code)
            .map(|&index| store.courses[index].clone())
    }

    pub fn contains(&self, code: &CourseIdentifier) -> bool {
        self.read().by_code.contains_key(code)
    }

    pub fn all(&self) -> Vec<Course> {
        self.read().courses.clone()
    }

    pub fn len(&self) -> usize {
        self.read().courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().courses.is_empty()
    }

    /// Courses whose title, code, instructor or department contain `query`,
    /// ignoring case, in insertion order.
    pub fn search(&self, query: &str) -> Vec<Course> {
        self.filtered(|c| c.matches(query))
    }

    pub fn find_by_instructor(&self, instructor: &str) -> Vec<Course> {
        let wanted = instructor.trim().to_lowercase();
        self.filtered(|c| c.instructor().to_lowercase() == wanted)
    }

    pub fn find_by_department(&self, department: &str) -> Vec<Course> {
        let wanted = department.trim().to_lowercase();
        self.filtered(|c| c.department().to_lowercase() == wanted)
    }

    pub fn find_by_semester(&self, semester: Semester) -> Vec<Course> {
        self.filtered(|c| c.semester() == semester)
    }

    /// Copy of every course, sorted by `order`.
    pub fn sorted(&self, order: CourseOrder) -> Vec<Course> {
        let mut courses = self.all();
        courses.sort_by(|a, b| order.compare(a, b));
        courses
    }

    /// Apply a validating edit to a stored course.
    ///
    /// The closure works on a copy; if it fails, the stored course is untouched.
    /// The code cannot be changed through this path.
    pub fn update<F>(&self, code: &str, edit: F) -> Result<Course, RecordsError>
    where
        F: FnOnce(&mut Course) -> Result<(), RecordsError>,
    {
        let key = CourseIdentifier::new(code)?;
        let mut store = self.write();
        let index = *store
            .by_code
            .get(&key)
            .ok_or_else(|| RecordsError::not_found("Course", key.as_str()))?;

        let mut updated = store.courses[index].clone();
        edit(&mut updated)?;
        store.courses[index] = updated.clone();

        debug!(code = %key, "course updated");
        Ok(updated)
    }

    /// Flip the active flag off. Unknown codes are ignored.
    pub fn deactivate(&self, code: &str) {
        let Ok(key) = CourseIdentifier::new(code) else {
            return;
        };
        let mut store = self.write();
        if let Some(&index) = store.by_code.get(&key) {
            store.courses[index].set_active(false);
            debug!(code = %key, "course deactivated");
        }
    }

    fn filtered<P>(&self, predicate: P) -> Vec<Course>
    where
        P: Fn(&Course) -> bool,
    {
        self.read()
            .courses
            .iter()
            .filter(|c| predicate(c))
            .cloned()
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn code(raw: &str) -> CourseIdentifier {
        CourseIdentifier::new(raw).unwrap()
    }

    fn course(raw: &str, title: &str, instructor: &str, department: &str) -> Course {
        Course::builder(code(raw), title)
            .credits(3)
            .instructor(instructor)
            .semester(Semester::Fall)
            .department(department)
            .build()
            .unwrap()
    }

    fn sample_registry() -> CourseRegistry {
        let registry = CourseRegistry::new();
        registry
            .add(course("CS101", "Intro to Programming", "Alan Turing", "Computer Science"))
            .unwrap();
        registry
            .add(course("MATH201", "Linear Algebra", "Emmy Noether", "Math"))
            .unwrap();
        registry
    }

    #[test]
    fn test_builder_creates_active_course() {
        let c = course("cs101", "Intro to Programming", "Alan Turing", "Computer Science");
        assert_eq!(c.code().as_str(), "CS101");
        assert_eq!(c.credits(), 3);
        assert_eq!(c.semester(), Semester::Fall);
        assert!(c.is_active());
    }

    #[test]
    fn test_builder_rejects_missing_fields() {
        let missing_instructor = Course::builder(code("CS101"), "Intro")
            .credits(3)
            .semester(Semester::Fall)
            .department("CS")
            .build();
        assert_eq!(missing_instructor.unwrap_err().kind(), ErrorKind::Validation);

        let missing_semester = Course::builder(code("CS101"), "Intro")
            .credits(3)
            .instructor("Turing")
            .department("CS")
            .build();
        assert!(missing_semester.is_err());

        let missing_department = Course::builder(code("CS101"), "Intro")
            .credits(3)
            .instructor("Turing")
            .semester(Semester::Fall)
            .build();
        assert!(missing_department.is_err());

        let missing_credits = Course::builder(code("CS101"), "Intro")
            .instructor("Turing")
            .semester(Semester::Fall)
            .department("CS")
            .build();
        assert!(missing_credits.is_err());
    }

    #[test]
    fn test_builder_rejects_non_positive_credits() {
        for credits in [0, -4] {
            let err = Course::builder(code("CS101"), "Intro")
                .credits(credits)
                .instructor("Turing")
                .semester(Semester::Fall)
                .department("CS")
                .build()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_builder_rejects_blank_title() {
        let err = Course::builder(code("CS101"), "  ")
            .credits(3)
            .instructor("Turing")
            .semester(Semester::Fall)
            .department("CS")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_setters_validate() {
        let mut c = course("CS101", "Intro", "Turing", "CS");
        assert!(c.set_credits(0).is_err());
        assert_eq!(c.credits(), 3);
        assert!(c.set_title("").is_err());
        assert_eq!(c.title(), "Intro");

        c.set_credits(4).unwrap();
        c.set_semester(Semester::Spring);
        assert_eq!(c.credits(), 4);
        assert_eq!(c.semester(), Semester::Spring);
    }

    #[test]
    fn test_add_then_find_returns_equal_course() {
        let registry = CourseRegistry::new();
        let c = course("CS101", "Intro", "Turing", "CS");
        registry.add(c.clone()).unwrap();

        assert_eq!(registry.find_by_id("CS101"), Some(c.clone()));
        assert_eq!(registry.find_by_id(" cs101 "), Some(c));
        assert!(registry.find_by_id("BIO100").is_none());
        assert!(registry.find_by_id("not a code").is_none());
    }

    #[test]
    fn test_add_duplicate_code_fails() {
        let registry = sample_registry();
        let err = registry
            .add(course("cs101", "Another Intro", "Hopper", "CS"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_by_id("CS101").unwrap().title(), "Intro to Programming");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let registry = sample_registry();

        let results = registry.search("cs");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code().as_str(), "CS101");

        assert_eq!(registry.search("ALGEBRA").len(), 1);
        assert_eq!(registry.search("noether").len(), 1);
        assert_eq!(registry.search("").len(), 2);
        assert!(registry.search("biology").is_empty());
    }

    #[test]
    fn test_find_by_instructor_department_semester() {
        let registry = sample_registry();
        registry
            .update("MATH201", |c| {
                c.set_semester(Semester::Spring);
                Ok(())
            })
            .unwrap();

        assert_eq!(registry.find_by_instructor("alan turing").len(), 1);
        assert!(registry.find_by_instructor("Alan").is_empty());
        assert_eq!(registry.find_by_department("MATH").len(), 1);
        assert_eq!(registry.find_by_semester(Semester::Fall).len(), 1);
        assert_eq!(registry.find_by_semester(Semester::Spring).len(), 1);
        assert!(registry.find_by_semester(Semester::Winter).is_empty());
    }

    #[test]
    fn test_update_failure_leaves_course_unchanged() {
        let registry = sample_registry();

        let result = registry.update("CS101", |c| {
            c.set_title("Programming I")?;
            c.set_credits(-1)
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(registry.find_by_id("CS101").unwrap().title(), "Intro to Programming");

        let missing = registry.update("BIO100", |_| Ok(()));
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_deactivate() {
        let registry = sample_registry();
        registry.deactivate("cs101");
        registry.deactivate("BIO100");

        assert!(!registry.find_by_id("CS101").unwrap().is_active());
        assert!(registry.find_by_id("MATH201").unwrap().is_active());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_returned_courses_are_copies() {
        let registry = sample_registry();
        let mut all = registry.all();
        all[0].set_title("Changed").unwrap();
        all.clear();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_by_id("CS101").unwrap().title(), "Intro to Programming");
    }

    #[test]
    fn test_all_keeps_insertion_order() {
        let registry = sample_registry();
        registry.add(course("BIO110", "Cells", "Franklin", "Biology")).unwrap();

        let codes: Vec<String> = registry.all().iter().map(|c| c.code().to_string()).collect();
        assert_eq!(codes, vec!["CS101", "MATH201", "BIO110"]);
    }
}
