use thiserror::Error;

use crate::validate::ValidationErrors;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// `types::custom` was handed a definition without callable
    /// `validate` / `makeErrorMessage` members.
    #[error("invalid custom type definition: {0}")]
    InvalidCustomType(ValidationErrors),

    /// `enforce` rejected a payload; `serialized` is the JSON form of `errors`.
    #[error("{serialized}")]
    SchemaViolation {
        errors: ValidationErrors,
        serialized: String,
    },

    #[error("malformed match arguments: {0}")]
    MalformedArgs(String),

    #[error("malformed pattern: {0}")]
    MalformedPattern(String),
}

impl Error {
    pub(crate) fn schema_violation(errors: ValidationErrors) -> Self {
        let serialized = errors.to_string();
        Error::SchemaViolation { errors, serialized }
    }
}
