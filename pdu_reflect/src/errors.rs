use pdu_gen::CodegenError;
use thiserror::Error;

/// Result alias used across the reflection crate.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Errors produced while executing class plans.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// Building or ordering the class plans failed.
    #[error("failed to build class plans: {0}")]
    Plan(#[from] CodegenError),

    #[error("class '{class}' is not defined by the schema")]
    UnknownClass { class: String },

    /// Abstract classes only exist as the parent view of a concrete class.
    #[error("class '{class}' is abstract and cannot be decoded on its own")]
    AbstractRoot { class: String },

    /// Input ended before a field could be read.
    #[error("truncated input at '{class}.{field}': needed {needed} bytes, {remaining} remaining")]
    Truncated {
        class: String,
        field: String,
        needed: usize,
        remaining: usize,
    },

    #[error("record of class '{found}' used where '{expected}' is required")]
    ClassMismatch { expected: String, found: String },

    #[error("record of class '{class}' has no parent view")]
    MissingParent { class: String },

    #[error("class '{class}' has no field '{field}'")]
    MissingField { class: String, field: String },

    /// The value stored under a field does not match its declared kind.
    #[error("field '{class}.{field}' holds {found}, expected {expected}")]
    FieldShape {
        class: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("fixed list '{class}.{field}' has {found} elements, expected {expected}")]
    FixedLengthMismatch {
        class: String,
        field: String,
        expected: u64,
        found: usize,
    },

    /// The live list length does not fit the width of its counter field.
    #[error("counter '{class}.{field}' cannot hold {count} elements")]
    CounterOverflow {
        class: String,
        field: String,
        count: usize,
    },

    #[error("class '{class}' has no bitfield '{name}'")]
    UnknownBitfield { class: String, name: String },

    #[error("field '{class}.{field}' is not a text-capable byte list")]
    NotText { class: String, field: String },
}
