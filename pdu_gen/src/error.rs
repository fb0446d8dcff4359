//! Error and warning types for the compiler pipeline.

use pdu_types::LiteralParseError;
use thiserror::Error;

/// Schema malformation. Always fatal to the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("class '{class}', attribute '{attribute}': unknown primitive type '{type_name}'")]
    UnknownPrimitive {
        class: String,
        attribute: String,
        type_name: String,
    },

    #[error("class '{class}' is declared more than once")]
    DuplicateClass { class: String },

    #[error("enum '{name}' is declared more than once")]
    DuplicateEnum { name: String },

    #[error("class '{class}' declares attribute '{attribute}' more than once")]
    DuplicateAttribute { class: String, attribute: String },

    #[error("class '{class}' names unknown parent '{parent}'")]
    UnknownParent { class: String, parent: String },

    #[error("cyclic inheritance: {}", chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },

    #[error("class '{class}' is an alias for unknown class '{target}'")]
    UnknownAliasTarget { class: String, target: String },

    #[error("alias class '{class}' must not declare a parent, attributes or initial values")]
    AliasWithBody { class: String },

    #[error("class '{class}', attribute '{attribute}': unknown class '{target}'")]
    UnknownClassRef {
        class: String,
        attribute: String,
        target: String,
    },

    #[error("class '{class}', attribute '{attribute}': bitfields are only valid on integer primitives, not on {kind}")]
    BitfieldOnNonPrimitive {
        class: String,
        attribute: String,
        kind: &'static str,
    },

    #[error("class '{class}', attribute '{attribute}': bitfield '{bitfield}' has an empty mask")]
    ZeroBitfieldMask {
        class: String,
        attribute: String,
        bitfield: String,
    },

    #[error("class '{class}', attribute '{attribute}': bitfield '{bitfield}' mask {mask:#x} exceeds the {width_bits}-bit host")]
    BitfieldMaskTooWide {
        class: String,
        attribute: String,
        bitfield: String,
        mask: u64,
        width_bits: u32,
    },

    #[error("class '{class}', attribute '{attribute}': bitfields '{first}' and '{second}' overlap")]
    OverlappingBitfields {
        class: String,
        attribute: String,
        first: String,
        second: String,
    },

    #[error("class '{class}', attribute '{attribute}': bitfield '{bitfield}' is declared more than once")]
    DuplicateBitfield {
        class: String,
        attribute: String,
        bitfield: String,
    },

    #[error("class '{class}', attribute '{attribute}': {reason}")]
    InvalidFixedList {
        class: String,
        attribute: String,
        reason: &'static str,
    },

    #[error("class '{class}', attribute '{attribute}': text access needs an 8-bit element type")]
    TextOnNonByteList { class: String, attribute: String },

    #[error("class '{class}', list '{attribute}': counter '{counter}' must be an integer primitive")]
    CounterNotInteger {
        class: String,
        attribute: String,
        counter: String,
    },

    #[error("class '{class}', list '{attribute}': counter '{counter}' is declared after the list it counts")]
    CounterAfterList {
        class: String,
        attribute: String,
        counter: String,
    },

    #[error("class '{class}', attribute '{attribute}': {source}")]
    InvalidLiteral {
        class: String,
        attribute: String,
        #[source]
        source: LiteralParseError,
    },

    #[error("enum '{name}' must use an integer storage type")]
    EnumStorageNotInteger { name: String },

    #[error("definition cycle between classes: {}", classes.join(", "))]
    DefinitionCycle { classes: Vec<String> },

    #[error("classes contain each other by value: {}", chain.join(" -> "))]
    ContainmentCycle { chain: Vec<String> },

    #[error("class '{class}', list '{attribute}': element class '{element}' has no bytes on the wire")]
    EmptyListElement {
        class: String,
        attribute: String,
        element: String,
    },
}

/// Unresolved cross-reference. Generation continues using the documented fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    #[error("class '{class}', list '{list}': counter field '{counter}' not found; the list decodes as empty")]
    CounterNotFound {
        class: String,
        list: String,
        counter: String,
    },

    #[error("class '{class}': counter '{counter}' already counts '{existing}'; '{list}' shares its value but is not linked")]
    CounterAlreadyLinked {
        class: String,
        counter: String,
        existing: String,
        list: String,
    },

    #[error("class '{class}', list '{list}': counter '{counter}' is not serialized; the list decodes as empty")]
    CounterNotSerialized {
        class: String,
        list: String,
        counter: String,
    },

    #[error("class '{class}', attribute '{attribute}': no alias for uid '{uid}'; using declared type '{declared}'")]
    AliasNotFound {
        class: String,
        attribute: String,
        uid: String,
        declared: String,
    },

    #[error("class '{class}': initial value for '{field}' matches no attribute in the inheritance chain; keeping the zero default")]
    InitialValueUnresolved { class: String, field: String },

    #[error("class '{class}': initial value for '{field}' targets a {kind} attribute; keeping the zero default")]
    InitialValueNotScalar {
        class: String,
        field: String,
        kind: &'static str,
    },

    #[error("class '{class}', field '{field}': enum '{type_name}' has no value '{variant}'; keeping the zero default")]
    EnumVariantNotFound {
        class: String,
        field: String,
        type_name: String,
        variant: String,
    },
}

/// Failures while turning plans into source text.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("no plan for class '{0}'")]
    MissingPlan(String),

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("type '{type_name}' is used with storage {first} and {second}")]
    ConflictingStorage {
        type_name: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("type name '{0}' is used by both a class and an enum")]
    NameClash(String),

    #[error("formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}
