//! PDU Schema Definitions
//!
//! This crate contains the ingestion-level definitions for the PDU codec
//! compiler. It provides pure data structures for representing a schema
//! document (classes, attributes, bitfields, enums, generator options) and
//! the UID alias table, without any resolution or code generation logic.

pub mod file;
pub mod literal;
pub mod options;
pub mod types;

// Re-export commonly used types at the crate root
pub use file::*;
pub use literal::*;
pub use options::*;
pub use types::*;
