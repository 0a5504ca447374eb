//! Error type for deep filter compilation.
//!
//! Every failure in the pipeline (cache population, classification,
//! partitioning, sub-query compilation) is reported as a [`DeepFilterError`]
//! and propagated unchanged to the caller of the entry point.

use std::fmt;

/// Deep filter error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepFilterError {
    /// A filter key matches neither a plain column nor a discovered relation
    UnknownField { entity: String, field: String },
    /// A struct-shaped field is used as a relation but carries no relation annotation
    UnclassifiableRelation { entity: String, field: String },
    /// A relation annotation is present but its value is empty
    MalformedAnnotation {
        entity: String,
        field: String,
        annotation: &'static str,
    },
    /// A plain column and a relation resolve to the same column name
    NameCollision { entity: String, column: String },
    /// The value given for a key has a shape that key does not accept
    InvalidValue { field: String, reason: String },
}

impl fmt::Display for DeepFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeepFilterError::UnknownField { entity, field } => {
                write!(f, "field '{field}' does not exist on '{entity}'")
            }
            DeepFilterError::UnclassifiableRelation { entity, field } => {
                write!(
                    f,
                    "field '{field}' of '{entity}' has no 'foreign_key' or 'many_to_many' annotation"
                )
            }
            DeepFilterError::MalformedAnnotation {
                entity,
                field,
                annotation,
            } => {
                write!(
                    f,
                    "annotation '{annotation}' on field '{field}' of '{entity}' has no value"
                )
            }
            DeepFilterError::NameCollision { entity, column } => {
                write!(
                    f,
                    "column '{column}' of '{entity}' is both a plain column and a relation"
                )
            }
            DeepFilterError::InvalidValue { field, reason } => {
                write!(f, "invalid filter value for '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for DeepFilterError {}

impl DeepFilterError {
    /// Name of the field the error is about
    pub fn field(&self) -> &str {
        match self {
            DeepFilterError::UnknownField { field, .. }
            | DeepFilterError::UnclassifiableRelation { field, .. }
            | DeepFilterError::MalformedAnnotation { field, .. }
            | DeepFilterError::InvalidValue { field, .. } => field,
            DeepFilterError::NameCollision { column, .. } => column,
        }
    }
}
