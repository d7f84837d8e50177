// Entity Models
//
// Each entity file holds the type, its validation, and (where one exists)
// the registry that owns every instance:
// - person:     shared profile + the Student/Instructor variant
// - student:    enrollment and grades live on the student
// - course:     builder-constructed, indexed by normalized code
// - grade:      grade letters and semesters

pub mod grade;
pub mod person;
pub mod instructor;
pub mod course;
pub mod student;

pub use grade::{Grade, Semester};
pub use person::{Person, Profile};
pub use instructor::Instructor;
pub use course::{Course, CourseBuilder, CourseRegistry};
pub use student::{Student, StudentRegistry, StudentStatus};
