//! PDU codec compiler.
//!
//! Turns a schema of PDU classes into marshal, unmarshal, size, equality,
//! hash, bitfield-accessor and diagnostic code for several target languages.
//! The pipeline is: load ([`schema::file`]) -> check ([`schema::model`]) ->
//! link ([`schema::resolver`]) -> order ([`schema::order`]) -> plan
//! ([`codegen::shared`]) -> render ([`codegen`] backends).

pub mod cmds;
pub mod codegen;
pub mod config;
pub mod error;
pub mod schema;

pub use config::GeneratorConfig;
pub use error::{CodegenError, ResolutionWarning, SchemaError};
