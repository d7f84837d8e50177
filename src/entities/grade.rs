// 🅰️ Grades and Semesters - fixed academic scales

use crate::error::RecordsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// GRADE
// ============================================================================

/// Letter grade on the ten-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Grade {
    pub const ALL: [Grade; 7] = [
        Grade::S,
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::E,
        Grade::F,
    ];

    pub fn letter(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        }
    }

    pub fn points(&self) -> f64 {
        match self {
            Grade::S => 10.0,
            Grade::A => 9.0,
            Grade::B => 8.0,
            Grade::C => 7.0,
            Grade::D => 6.0,
            Grade::E => 5.0,
            Grade::F => 0.0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Grade::S => "Outstanding !",
            Grade::A => "Very Good !",
            Grade::B => "Good !",
            Grade::C => "Average",
            Grade::D => "Below Average",
            Grade::E => "Poor",
            Grade::F => "Fail",
        }
    }

    pub fn is_passing(&self) -> bool {
        self.points() >= 5.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}) - {}", self.letter(), self.points(), self.description())
    }
}

impl FromStr for Grade {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Grade::ALL
            .into_iter()
            .find(|g| g.letter().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                RecordsError::validation("grade", format!("'{}' is not one of S, A-F", wanted))
            })
    }
}

// ============================================================================
// SEMESTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Semester {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Semester {
    pub const ALL: [Semester; 4] = [
        Semester::Spring,
        Semester::Summer,
        Semester::Fall,
        Semester::Winter,
    ];

    /// Upper-case variant name, used in CSV files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Spring => "SPRING",
            Semester::Summer => "SUMMER",
            Semester::Fall => "FALL",
            Semester::Winter => "WINTER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Semester::Spring => "Spring Semester",
            Semester::Summer => "Summer Semester",
            Semester::Fall => "Fall Semester",
            Semester::Winter => "Winter Semester",
        }
    }

    pub fn order(&self) -> u8 {
        match self {
            Semester::Spring => 1,
            Semester::Summer => 2,
            Semester::Fall => 3,
            Semester::Winter => 4,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Semester {
    type Err = RecordsError;

    /// Accepts "FALL", "fall" or "Fall Semester".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Semester::ALL
            .into_iter()
            .find(|sem| {
                sem.as_str().eq_ignore_ascii_case(wanted)
                    || sem.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| RecordsError::validation("semester", format!("unknown semester '{}'", wanted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_points_scale() {
        let points: Vec<f64> = Grade::ALL.iter().map(|g| g.points()).collect();
        assert_eq!(points, vec![10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 0.0]);
    }

    #[test]
    fn test_grade_passing_threshold() {
        assert!(Grade::E.is_passing());
        assert!(Grade::S.is_passing());
        assert!(!Grade::F.is_passing());
    }

    #[test]
    fn test_grade_parse_and_display() {
        assert_eq!("a".parse::<Grade>().unwrap(), Grade::A);
        assert_eq!(" S ".parse::<Grade>().unwrap(), Grade::S);
        assert!("G".parse::<Grade>().is_err());
        assert_eq!(Grade::B.to_string(), "B (8.0) - Good !");
    }

    #[test]
    fn test_semester_parse_accepts_both_spellings() {
        assert_eq!("FALL".parse::<Semester>().unwrap(), Semester::Fall);
        assert_eq!("winter".parse::<Semester>().unwrap(), Semester::Winter);
        assert_eq!("Spring Semester".parse::<Semester>().unwrap(), Semester::Spring);
        assert!("Autumn".parse::<Semester>().is_err());
    }

    #[test]
    fn test_semester_order() {
        let orders: Vec<u8> = Semester::ALL.iter().map(|s| s.order()).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert_eq!(Semester::Summer.to_string(), "Summer Semester");
    }
}
