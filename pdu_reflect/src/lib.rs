/* PDU reflection runtime.

   Executes the class plans built by `pdu_gen` directly against a dynamic
   value tree, so PDUs can be built, encoded, decoded, compared and dumped
   from a schema without generating and compiling any code. */

pub mod errors;
pub mod formatter;
pub mod reflect;
pub mod value;
mod wire;

pub use errors::{ReflectError, ReflectResult};
pub use formatter::{record_to_json, FormatOptions};
pub use reflect::Reflector;
pub use value::{Record, Scalar, Value};
