// 🎓 Student Entity + Registry
//
// Enrollment and grades live inside the Student itself: a set of enrolled
// course codes plus a code → grade map. A code is in the grade map only if it
// is also in the enrolled set, and every mutation below keeps it that way.
//
// The registry indexes students by id and by registration number. Both
// indices sit behind one lock so they always change together.

use crate::entities::course::Course;
use crate::entities::grade::Grade;
use crate::entities::person::Profile;
use crate::error::{require_non_empty, RecordsError};
use crate::sorting::StudentOrder;
use crate::values::{CourseIdentifier, Name};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

// ============================================================================
// STUDENT STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
    Suspended,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "ACTIVE",
            StudentStatus::Inactive => "INACTIVE",
            StudentStatus::Graduated => "GRADUATED",
            StudentStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(StudentStatus::Active),
            "INACTIVE" => Ok(StudentStatus::Inactive),
            "GRADUATED" => Ok(StudentStatus::Graduated),
            "SUSPENDED" => Ok(StudentStatus::Suspended),
            other => Err(RecordsError::validation(
                "status",
                format!("unknown student status '{}'", other),
            )),
        }
    }
}

// ============================================================================
// STUDENT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    profile: Profile,
    regno: String,
    enrolled: BTreeSet<CourseIdentifier>,
    grades: BTreeMap<CourseIdentifier, Grade>,
    status: StudentStatus,
}

impl Student {
    pub fn new(id: &str, name: Name, email: &str, regno: &str) -> Result<Self, RecordsError> {
        Ok(Student {
            profile: Profile::new(id, name, email)?,
            regno: require_non_empty("registration number", regno)?,
            enrolled: BTreeSet::new(),
            grades: BTreeMap::new(),
            status: StudentStatus::Active,
        })
    }

    /// Keep a creation date recorded elsewhere (CSV import).
    pub fn with_created_on(mut self, date: NaiveDate) -> Self {
        self.profile.set_created_on(date);
        self
    }

    pub fn with_status(mut self, status: StudentStatus) -> Self {
        self.status = status;
        if status == StudentStatus::Inactive {
            self.profile.set_active(false);
        }
        self
    }

    pub fn role(&self) -> &'static str {
        "Student"
    }

    pub fn display_info(&self) -> String {
        format!(
            "Student: {} (Reg: {}) - {} courses enrolled",
            self.profile.name().full_name(),
            self.regno,
            self.enrolled.len()
        )
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn id(&self) -> &str {
        self.profile.id()
    }

    pub fn name(&self) -> &Name {
        self.profile.name()
    }

    pub fn email(&self) -> &str {
        self.profile.email()
    }

    pub fn is_active(&self) -> bool {
        self.profile.is_active()
    }

    pub fn regno(&self) -> &str {
        &self.regno
    }

    pub fn status(&self) -> StudentStatus {
        self.status
    }

    /// Enrolled course codes in code order.
    pub fn enrolled_courses(&self) -> Vec<CourseIdentifier> {
        self.enrolled.iter().cloned().collect()
    }

    /// Recorded grades keyed by course code.
    pub fn grades(&self) -> BTreeMap<CourseIdentifier, Grade> {
        self.grades.clone()
    }

    pub fn grade_for(&self, code: &CourseIdentifier) -> Option<Grade> {
        self.grades.get(code).copied()
    }

    pub fn is_enrolled(&self, code: &CourseIdentifier) -> bool {
        self.enrolled.contains(code)
    }

    pub fn total_enrolled(&self) -> usize {
        self.enrolled.len()
    }

    pub fn has_grades(&self) -> bool {
        !self.grades.is_empty()
    }

    /// Search match over full name, registration number and id, ignoring case.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.profile.name().full_name().to_lowercase().contains(&needle)
            || self.regno.to_lowercase().contains(&needle)
            || self.profile.id().to_lowercase().contains(&needle)
    }

    pub fn enroll(&mut self, course: &Course) -> Result<(), RecordsError> {
        if !self.enrolled.insert(course.code().clone()) {
            return Err(RecordsError::conflict(format!(
                "Student {} already enrolled in course: {}",
                self.id(),
                course.code()
            )));
        }
        Ok(())
    }

    /// Remove the enrollment together with any grade recorded for it.
    pub fn unenroll(&mut self, code: &CourseIdentifier) -> Result<(), RecordsError> {
        if !self.enrolled.remove(code) {
            return Err(self.not_enrolled(code));
        }
        self.grades.remove(code);
        Ok(())
    }

    /// Record a grade for an enrolled course, replacing any earlier grade.
    pub fn assign_grade(&mut self, code: &CourseIdentifier, grade: Grade) -> Result<(), RecordsError> {
        if !self.enrolled.contains(code) {
            return Err(self.not_enrolled(code));
        }
        self.grades.insert(code.clone(), grade);
        Ok(())
    }

    fn not_enrolled(&self, code: &CourseIdentifier) -> RecordsError {
        RecordsError::conflict(format!(
            "Student {} not enrolled in course: {}",
            self.id(),
            code
        ))
    }
}

// ============================================================================
// STUDENT REGISTRY
// ============================================================================

#[derive(Debug, Default)]
struct StudentStore {
    /// Insertion order
    students: Vec<Student>,
    by_id: HashMap<String, usize>,
    by_regno: HashMap<String, usize>,
}

impl StudentStore {
    fn index_of(&self, id: &str) -> Result<usize, RecordsError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| RecordsError::not_found("Student", id))
    }
}

/// Registry of all students, unique by id and by registration number.
///
/// One lock guards both indices and the records, so a failed insert or
/// rename leaves everything as it was. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct StudentRegistry {
    store: Arc<RwLock<StudentStore>>,
}

impl StudentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StudentStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StudentStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, student: Student) -> Result<(), RecordsError> {
        let mut store = self.write();

        if store.by_id.contains_key(student.id()) {
            return Err(RecordsError::duplicate("Student", "ID", student.id()));
        }
        if store.by_regno.contains_key(student.regno()) {
            return Err(RecordsError::duplicate(
                "Student",
                "registration number",
                student.regno(),
            ));
        }

        debug!(id = student.id(), regno = student.regno(), "student added");
        let index = store.students.len();
        store.by_id.insert(student.id().to_string(), index);
        store.by_regno.insert(student.regno().to_string(), index);
        store.students.push(student);
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Option<Student> {
        let store = self.read();
        store.by_id.get(id).map(|&i| store.students[i].clone())
    }

    pub fn find_by_regno(&self, regno: &str) -> Option<Student> {
        let store = self.read();
        store.by_regno.get(regno).map(|&i| store.students[i].clone())
    }

    pub fn all(&self) -> Vec<Student> {
        self.read().students.clone()
    }

    pub fn len(&self) -> usize {
        self.read().students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().students.is_empty()
    }

    /// Students whose full name, registration number or id contain `query`,
    /// ignoring case, in insertion order.
    pub fn search(&self, query: &str) -> Vec<Student> {
        self.read()
            .students
            .iter()
            .filter(|s| s.matches(query))
            .cloned()
            .collect()
    }

    /// Copy of every student, sorted by `order` (stable).
    pub fn sorted(&self, order: StudentOrder) -> Vec<Student> {
        let mut students = self.all();
        students.sort_by(|a, b| order.compare(a, b));
        students
    }

    /// Mark inactive. Unknown ids are ignored.
    pub fn deactivate(&self, id: &str) {
        let mut store = self.write();
        if let Some(&index) = store.by_id.get(id) {
            let student = &mut store.students[index];
            student.profile.set_active(false);
            student.status = StudentStatus::Inactive;
            debug!(id, "student deactivated");
        }
    }

    /// Moving to or from INACTIVE also flips the active flag.
    pub fn set_status(&self, id: &str, status: StudentStatus) -> Result<(), RecordsError> {
        self.with_student(id, |student| {
            match status {
                StudentStatus::Inactive => student.profile.set_active(false),
                StudentStatus::Active => student.profile.set_active(true),
                StudentStatus::Graduated | StudentStatus::Suspended => {}
            }
            student.status = status;
            debug!(id, status = status.as_str(), "student status changed");
            Ok(())
        })
    }

    pub fn update_contact(&self, id: &str, name: Name, email: &str) -> Result<(), RecordsError> {
        self.with_student(id, |student| {
            student.profile.set_name(name);
            student.profile.set_email(email);
            Ok(())
        })
    }

    /// Change a student's registration number, keeping it unique.
    pub fn rename_regno(&self, id: &str, new_regno: &str) -> Result<(), RecordsError> {
        let new_regno = require_non_empty("registration number", new_regno)?;
        let mut store = self.write();
        let index = store.index_of(id)?;

        let old_regno = store.students[index].regno.clone();
        if old_regno == new_regno {
            return Ok(());
        }
        if store.by_regno.contains_key(&new_regno) {
            return Err(RecordsError::duplicate(
                "Student",
                "registration number",
                new_regno,
            ));
        }

        store.by_regno.remove(&old_regno);
        store.by_regno.insert(new_regno.clone(), index);
        store.students[index].regno = new_regno;
        debug!(id, old = %old_regno, new = %store.students[index].regno, "registration number changed");
        Ok(())
    }

    pub fn enroll(&self, student_id: &str, course: &Course) -> Result<(), RecordsError> {
        self.with_student(student_id, |student| student.enroll(course))?;
        debug!(student_id, course = %course.code(), "student enrolled");
        Ok(())
    }

    pub fn unenroll(&self, student_id: &str, course: &Course) -> Result<(), RecordsError> {
        self.with_student(student_id, |student| student.unenroll(course.code()))?;
        debug!(student_id, course = %course.code(), "student unenrolled");
        Ok(())
    }

    pub fn assign_grade(
        &self,
        student_id: &str,
        code: &CourseIdentifier,
        grade: Grade,
    ) -> Result<(), RecordsError> {
        self.with_student(student_id, |student| student.assign_grade(code, grade))?;
        debug!(student_id, course = %code, grade = grade.letter(), "grade recorded");
        Ok(())
    }

    /// Run a mutation against the stored student under the write lock.
    ///
    /// Every `Student` mutation either fully applies or returns an error
    /// before touching state, so no rollback is needed here.
    fn with_student<F>(&self, id: &str, mutate: F) -> Result<(), RecordsError>
    where
        F: FnOnce(&mut Student) -> Result<(), RecordsError>,
    {
        let mut store = self.write();
        let index = store.index_of(id)?;
        mutate(&mut store.students[index])
    }
}

// ============================================================================
// TESTS
// ============================================================================
