//! Matrix parsing errors.
//!
//! Malformed rules are rejected instead of being defaulted to zero, so a
//! typo in the matrix surfaces as an error rather than a silently empty
//! section.

use thiserror::Error;

/// Errors produced while parsing a textual matrix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// A `grade.topic.count` fragment could not be read as integers.
    #[error("malformed rule '{rule}' in {section} field: {reason}")]
    MalformedRule {
        section: String,
        rule: String,
        reason: String,
    },

    /// A difficulty override entry began with something other than M, T or S.
    #[error("unknown type marker '{marker}' in tier-{tier} entry '{entry}'")]
    UnknownTypeMarker {
        tier: u8,
        entry: String,
        marker: char,
    },

    /// The matrix duration was negative or not a finite number.
    #[error("invalid duration: {0} minutes")]
    InvalidDuration(f64),
}

impl MatrixError {
    /// The offending rule or entry text.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            MatrixError::MalformedRule { rule, .. } => Some(rule),
            MatrixError::UnknownTypeMarker { entry, .. } => Some(entry),
            MatrixError::InvalidDuration(_) => None,
        }
    }
}
