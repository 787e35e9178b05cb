//! Error types for schema construction, serialization and deserialization.

use std::any::TypeId;

use thiserror::Error;

/// Errors raised while building or querying a [`TypeSchema`](crate::TypeSchema).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two members resolve to the same primary or alternate name.
    #[error(
        "type '{type_name}': member '{member}' uses name '{name}' already taken by member '{existing}'"
    )]
    NameConflict {
        type_name: String,
        name: String,
        member: String,
        existing: String,
    },
    /// Strict lookup of a member name the schema does not contain.
    #[error("type '{type_name}' has no member named '{name}'")]
    MemberNotFound { type_name: String, name: String },
    /// No [`TypeDescription`](crate::TypeDescription) is registered for the type.
    #[error("no type description registered for {type_name}")]
    UnknownType { type_id: TypeId, type_name: String },
}

/// Errors that can occur while writing an object into a [`Value`](crate::Value).
#[derive(Debug, Error)]
pub enum SerializeError {
    /// A field could not be converted to a [`Value`](crate::Value).
    #[error("failed to serialize field '{field}': {message}")]
    FieldError { field: String, message: String },
    /// A member accessor was handed an instance of the wrong type.
    #[error("member '{member}' expects an instance of '{expected}'")]
    InstanceMismatch {
        member: String,
        expected: &'static str,
    },
    /// Schema lookup or construction failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Format encoding error (RON/bincode).
    #[error("format error: {0}")]
    FormatError(String),
}

/// Errors that can occur while applying a [`Value`](crate::Value) onto an object.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// The serialized map names a member the schema does not know.
    #[error("unknown member '{name}' for type '{type_name}'")]
    UnknownMember { type_name: String, name: String },
    /// The member has neither a setter nor in-place content access.
    #[error("member '{member}' of type '{type_name}' cannot be written")]
    ReadOnlyMember { type_name: String, member: String },
    /// A value had an unexpected shape.
    #[error("type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// A member accessor was handed an instance of the wrong type.
    #[error("member '{member}' expects an instance of '{expected}'")]
    InstanceMismatch {
        member: String,
        expected: &'static str,
    },
    /// Schema lookup or construction failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Format decoding error.
    #[error("format error: {0}")]
    FormatError(String),
}
