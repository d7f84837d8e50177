// 🔖 Value Types - validated, immutable identifiers
//
// A `Name` or `CourseIdentifier` that exists is always valid: validation
// happens once, in the constructor, and there are no setters.

use crate::error::{require_non_empty, RecordsError};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// ============================================================================
// NAME
// ============================================================================

/// A person's first and last name, both non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Name {
    first: String,
    last: String,
}

impl Name {
    pub fn new(first: &str, last: &str) -> Result<Self, RecordsError> {
        Ok(Name {
            first: require_non_empty("first name", first)?,
            last: require_non_empty("last name", last)?,
        })
    }

    /// Split a "First Last" string on the first space.
    ///
    /// "Ada King Lovelace" becomes first = "Ada", last = "King Lovelace".
    /// A single word has no last name and is rejected.
    pub fn parse_full(full: &str) -> Result<Self, RecordsError> {
        let trimmed = full.trim();
        match trimmed.split_once(' ') {
            Some((first, last)) => Name::new(first, last),
            None => Name::new(trimmed, ""),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

// ============================================================================
// COURSE IDENTIFIER
// ============================================================================

static COURSE_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,4}\d{3,4}$").expect("course code pattern is valid"));

/// Course code: 2-4 letters followed by 3-4 digits (CS101, MATH2001).
///
/// Input is trimmed and uppercased before matching, so "  cs101" and "CS101"
/// produce equal identifiers. Ordering is by the normalized string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CourseIdentifier(String);

impl CourseIdentifier {
    pub fn new(raw: &str) -> Result<Self, RecordsError> {
        let normalized = raw.trim().to_uppercase();
        if !COURSE_CODE_PATTERN.is_match(&normalized) {
            return Err(RecordsError::validation(
                "course code",
                format!(
                    "'{}' does not match 2-4 letters followed by 3-4 digits (e.g. CS101, MATH2001)",
                    raw.trim()
                ),
            ));
        }
        Ok(CourseIdentifier(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CourseIdentifier {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseIdentifier::new(s)
    }
}

impl fmt::Display for CourseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CourseIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
