pub mod functions;
pub mod helpers;
pub mod runtime;
pub mod types;

/* Re-export main public functions */
pub use functions::RustClassEmitter;
pub use runtime::emit_runtime;
pub use types::{emit_storage_wrapper, emit_struct};
