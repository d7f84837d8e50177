// ⚠️ Records Errors - every core failure is one of four kinds
//
// Value types, entities, registries and the transcript engine all return
// `RecordsError`. Nothing in the core retries or recovers; the caller decides
// how to present the failure.

use thiserror::Error;

/// The four failure kinds the records core can signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    DuplicateKey,
    NotFound,
    Conflict,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::DuplicateKey => "duplicate key",
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordsError {
    /// Malformed input to a value type or entity constructor
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// An entity with the same unique key is already registered
    #[error("{entity} with {key} '{value}' already exists")]
    DuplicateKey {
        entity: &'static str,
        key: &'static str,
        value: String,
    },

    /// Reference to an id that is not in its registry
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation violates a state precondition
    #[error("{0}")]
    Conflict(String),
}

impl RecordsError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        RecordsError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn duplicate(entity: &'static str, key: &'static str, value: impl Into<String>) -> Self {
        RecordsError::DuplicateKey {
            entity,
            key,
            value: value.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        RecordsError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        RecordsError::Conflict(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RecordsError::Validation { .. } => ErrorKind::Validation,
            RecordsError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            RecordsError::NotFound { .. } => ErrorKind::NotFound,
            RecordsError::Conflict(_) => ErrorKind::Conflict,
        }
    }
}

/// Reject a string that is empty after trimming; returns the trimmed value.
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<String, RecordsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordsError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            RecordsError::validation("credits", "must be positive").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RecordsError::duplicate("Student", "id", "S1").kind(),
            ErrorKind::DuplicateKey
        );
        assert_eq!(RecordsError::not_found("Course", "CS101").kind(), ErrorKind::NotFound);
        assert_eq!(RecordsError::conflict("already enrolled").kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_messages() {
        let err = RecordsError::duplicate("Student", "registration number", "REG-1");
        assert_eq!(
            err.to_string(),
            "Student with registration number 'REG-1' already exists"
        );

        let err = RecordsError::not_found("Course", "CS101");
        assert_eq!(err.to_string(), "Course not found: CS101");
    }

    #[test]
    fn test_require_non_empty_trims() {
        assert_eq!(require_non_empty("title", "  Algebra ").unwrap(), "Algebra");
        assert!(require_non_empty("title", "   ").is_err());
    }
}
