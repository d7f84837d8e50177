// 🧑‍🏫 Instructor Entity

use crate::entities::person::Profile;
use crate::error::{require_non_empty, RecordsError};
use crate::values::Name;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instructor {
    profile: Profile,
    employee_id: String,
    department: String,
    specialization: Option<String>,
    salary: Option<f64>,
}

impl Instructor {
    pub fn new(
        id: &str,
        name: Name,
        email: &str,
        employee_id: &str,
        department: &str,
    ) -> Result<Self, RecordsError> {
        Ok(Instructor {
            profile: Profile::new(id, name, email)?,
            employee_id: require_non_empty("employee id", employee_id)?,
            department: require_non_empty("department", department)?,
            specialization: None,
            salary: None,
        })
    }

    pub fn role(&self) -> &'static str {
        "Instructor"
    }

    pub fn display_info(&self) -> String {
        format!(
            "Instructor: {} ({}) - {} Department",
            self.profile.name().full_name(),
            self.employee_id,
            self.department
        )
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn id(&self) -> &str {
        self.profile.id()
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn specialization(&self) -> Option<&str> {
        self.specialization.as_deref()
    }

    pub fn salary(&self) -> Option<f64> {
        self.salary
    }

    pub fn set_employee_id(&mut self, employee_id: &str) -> Result<(), RecordsError> {
        self.employee_id = require_non_empty("employee id", employee_id)?;
        Ok(())
    }

    pub fn set_department(&mut self, department: &str) -> Result<(), RecordsError> {
        self.department = require_non_empty("department", department)?;
        Ok(())
    }

    /// Blank input clears the specialization.
    pub fn set_specialization(&mut self, specialization: Option<&str>) {
        self.specialization = specialization
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    pub fn set_salary(&mut self, salary: f64) -> Result<(), RecordsError> {
        if !salary.is_finite() || salary < 0.0 {
            return Err(RecordsError::validation("salary", "cannot be negative"));
        }
        self.salary = Some(salary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn turing() -> Instructor {
        Instructor::new(
            "I001",
            Name::new("Alan", "Turing").unwrap(),
            "alan@example.edu",
            "EMP-7",
            "Computer Science",
        )
        .unwrap()
    }

    #[test]
    fn test_instructor_creation() {
        let instructor = turing();
        assert_eq!(instructor.role(), "Instructor");
        assert_eq!(instructor.employee_id(), "EMP-7");
        assert!(instructor.specialization().is_none());
        assert!(instructor.salary().is_none());
    }

    #[test]
    fn test_instructor_requires_department() {
        let err = Instructor::new(
            "I002",
            Name::new("Grace", "Hopper").unwrap(),
            "grace@example.edu",
            "EMP-8",
            " ",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_salary_cannot_be_negative() {
        let mut instructor = turing();
        assert!(instructor.set_salary(-1.0).is_err());
        assert!(instructor.salary().is_none());

        instructor.set_salary(0.0).unwrap();
        assert_eq!(instructor.salary(), Some(0.0));
    }

    #[test]
    fn test_specialization_blank_clears() {
        let mut instructor = turing();
        instructor.set_specialization(Some("Computability"));
        assert_eq!(instructor.specialization(), Some("Computability"));

        instructor.set_specialization(Some("  "));
        assert!(instructor.specialization().is_none());
    }
}
