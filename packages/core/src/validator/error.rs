use thiserror::Error;

/// A malformed validation specification.
///
/// Raised while rules are registered or prepared, never while serving. It is
/// meant to abort application start-up.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpecError {
    #[error("{0:?} is not a converter specification; expected name or name(args)")]
    Malformed(String),

    #[error("a list rule must wrap exactly one rule, got {0}")]
    ListArity(usize),

    #[error("field {field:?}: no converter named {name:?} is registered")]
    UnknownConverter { field: String, name: String },

    #[error("bad converter arguments {args:?}: {reason}")]
    BadArguments { args: String, reason: String },

    #[error("invalid pattern {pattern:?}: {reason}")]
    BadPattern { pattern: String, reason: String },
}

/// Request input that failed validation.
///
/// Each kind carries the complete list of fields concerned, never just the
/// first one found.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unexpected fields: {}", .0.join(", "))]
    UnexpectedFields(Vec<String>),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("invalid fields: {}", .0.join(", "))]
    InvalidFields(Vec<String>),
}

impl ValidationError {
    pub fn fields(&self) -> &[String] {
        match self {
            ValidationError::UnexpectedFields(f)
            | ValidationError::MissingFields(f)
            | ValidationError::InvalidFields(f) => f,
        }
    }
}

/// A single value a converter refused.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0}")]
pub struct ConversionError(pub String);

impl ConversionError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
