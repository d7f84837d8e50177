// 👤 Person - shared identity fields for students and instructors
//
// There are exactly two kinds of person, so they are a flat sum type rather
// than a hierarchy. Both variants embed a `Profile` holding the common fields.

use crate::entities::instructor::Instructor;
use crate::entities::student::Student;
use crate::error::{require_non_empty, RecordsError};
use crate::values::Name;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

// ============================================================================
// PROFILE
// ============================================================================

/// Identity and contact data common to every person.
///
/// `id` never changes after creation. Name, email and the active flag are
/// changed only by the registry that owns the person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    id: String,
    name: Name,
    email: String,
    created_at: DateTime<Utc>,
    active: bool,
}

impl Profile {
    pub fn new(id: &str, name: Name, email: &str) -> Result<Self, RecordsError> {
        Ok(Profile {
            id: require_non_empty("id", id)?,
            name,
            email: email.trim().to_string(),
            created_at: Utc::now(),
            active: true,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_name(&mut self, name: Name) {
        self.name = name;
    }

    pub(crate) fn set_email(&mut self, email: &str) {
        self.email = email.trim().to_string();
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_created_on(&mut self, date: NaiveDate) {
        self.created_at = date.and_time(chrono::NaiveTime::MIN).and_utc();
    }
}

// ============================================================================
// PERSON
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Person {
    Student(Student),
    Instructor(Instructor),
}

impl Person {
    pub fn profile(&self) -> &Profile {
        match self {
            Person::Student(s) => s.profile(),
            Person::Instructor(i) => i.profile(),
        }
    }

    pub fn id(&self) -> &str {
        self.profile().id()
    }

    pub fn name(&self) -> &Name {
        self.profile().name()
    }

    pub fn role(&self) -> &'static str {
        match self {
            Person::Student(s) => s.role(),
            Person::Instructor(i) => i.role(),
        }
    }

    pub fn display_info(&self) -> String {
        match self {
            Person::Student(s) => s.display_info(),
            Person::Instructor(i) => i.display_info(),
        }
    }
}

impl From<Student> for Person {
    fn from(student: Student) -> Self {
        Person::Student(student)
    }
}

impl From<Instructor> for Person {
    fn from(instructor: Instructor) -> Self {
        Person::Instructor(instructor)
    }
}
