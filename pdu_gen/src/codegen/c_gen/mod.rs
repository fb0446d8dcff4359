pub mod functions;
pub mod helpers;
pub mod runtime;
pub mod types;

pub use functions::{CClassEmitter, emit_wrapper_functions};
pub use runtime::{emit_runtime_decls, emit_runtime_defs};
pub use types::{emit_forward_declarations, emit_prototypes, emit_storage_typedef, emit_struct};
