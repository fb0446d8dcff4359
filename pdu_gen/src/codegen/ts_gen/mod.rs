pub mod class;
pub mod helpers;
pub mod runtime;
pub mod types;

pub use class::TsClassEmitter;
pub use runtime::emit_runtime;
pub use types::{emit_alias, emit_storage_type};
