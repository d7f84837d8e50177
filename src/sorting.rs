// ↕️ Sort Orders - named orderings for listings
//
// GPA ordering needs course credits, so it lives in the transcript engine
// (`TranscriptEngine::ranking`), not here.

use crate::entities::course::Course;
use crate::entities::student::Student;
use crate::error::RecordsError;
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StudentOrder {
    #[default]
    Name,
    RegNo,
    CreatedOn,
    /// Most enrolled courses first
    Enrolled,
}

impl StudentOrder {
    pub fn compare(&self, a: &Student, b: &Student) -> Ordering {
        match self {
            StudentOrder::Name => a.name().full_name().cmp(&b.name().full_name()),
            StudentOrder::RegNo => a.regno().cmp(b.regno()),
            StudentOrder::CreatedOn => a.profile().created_at().cmp(&b.profile().created_at()),
            StudentOrder::Enrolled => b.total_enrolled().cmp(&a.total_enrolled()),
        }
    }
}

impl FromStr for StudentOrder {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(StudentOrder::Name),
            "regno" => Ok(StudentOrder::RegNo),
            "date" | "created" => Ok(StudentOrder::CreatedOn),
            "enrolled" | "courses" => Ok(StudentOrder::Enrolled),
            other => Err(RecordsError::validation(
                "sort key",
                format!("'{}' is not one of name, regno, date, enrolled", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseOrder {
    #[default]
    Code,
    Title,
    /// Highest credits first
    Credits,
    Department,
    Instructor,
    DepartmentThenCode,
}

impl CourseOrder {
    pub fn compare(&self, a: &Course, b: &Course) -> Ordering {
        match self {
            CourseOrder::Code => a.code().cmp(b.code()),
            CourseOrder::Title => a.title().cmp(b.title()),
            CourseOrder::Credits => b.credits().cmp(&a.credits()),
            CourseOrder::Department => a.department().cmp(b.department()),
            CourseOrder::Instructor => a.instructor().cmp(b.instructor()),
            CourseOrder::DepartmentThenCode => a
                .department()
                .cmp(b.department())
                .then_with(|| a.code().cmp(b.code())),
        }
    }
}

impl FromStr for CourseOrder {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "code" => Ok(CourseOrder::Code),
            "title" => Ok(CourseOrder::Title),
            "credits" => Ok(CourseOrder::Credits),
            "department" => Ok(CourseOrder::Department),
            "instructor" => Ok(CourseOrder::Instructor),
            "department-code" => Ok(CourseOrder::DepartmentThenCode),
            other => Err(RecordsError::validation(
                "sort key",
                format!(
                    "'{}' is not one of code, title, credits, department, instructor, department-code",
                    other
                ),
            )),
        }
    }
}
