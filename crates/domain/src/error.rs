//! Unified error types for the domain layer

use thiserror::Error;

use crate::ids::{ActorId, LineId};

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A line references an actor that is not on the roster
    #[error("Line {line_id} references unknown actor '{actor_id}'")]
    UnknownActor { line_id: LineId, actor_id: ActorId },

    /// Two roster entries share an id
    #[error("Duplicate actor id '{0}'")]
    DuplicateActor(ActorId),

    /// Beat indices went backwards
    #[error("Line {line_id} has beat {beat_index}, earlier beat was {previous}")]
    BeatRegression {
        line_id: LineId,
        beat_index: u32,
        previous: u32,
    },

    /// Line ids are not strictly increasing
    #[error("Line {line_id} is out of creation order")]
    LineOrder { line_id: LineId },

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("title cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: title cannot be empty");
    }

    #[test]
    fn test_unknown_actor_error_names_actor() {
        let err = DomainError::UnknownActor {
            line_id: LineId::from_raw(4),
            actor_id: ActorId::new("ghost"),
        };
        assert!(err.to_string().contains("ghost"));
        assert!(err.to_string().contains('4'));
    }
}
