use crate::codegen::rust_gen::helpers::module_ident;
use crate::codegen::rust_gen::{RustClassEmitter, emit_runtime, emit_storage_wrapper, emit_struct};
use crate::codegen::shared::collect_storage_types;
use crate::codegen::{Backend, GeneratedFile, GenerationUnit, Language};
use crate::error::CodegenError;
use crate::schema::EmissionOrdering;
use std::fmt::Write;
use std::path::PathBuf;

/* Emits one self-contained `<package>.rs` module */
pub struct RustBackend;

impl Backend for RustBackend {
  fn language(&self) -> Language {
    Language::Rust
  }

  /* Rust resolves names module-wide, parents first keeps the file readable */
  fn ordering(&self) -> EmissionOrdering {
    EmissionOrdering::ParentsFirst
  }

  fn render(&self, unit: &GenerationUnit) -> Result<Vec<GeneratedFile>, CodegenError> {
    let wrappers = collect_storage_types(unit.schema)?;
    let mut output = String::new();

    writeln!(output, "// Generated by pdu-gen from package `{}`. Do not edit.", unit.config.package)?;
    writeln!(output)?;
    emit_runtime(&mut output, unit.config)?;

    for wrapper in wrappers.values() {
      emit_storage_wrapper(&mut output, wrapper)?;
    }

    let emitter = RustClassEmitter {
      config: unit.config,
      wrappers: &wrappers,
    };
    for name in &unit.order {
      let plan = unit.plan(name)?;
      emit_struct(&mut output, plan)?;
      emitter.emit_impl(&mut output, plan)?;
    }

    /* Trim the trailing blank line */
    while output.ends_with("\n\n") {
      output.pop();
    }

    Ok(vec![GeneratedFile {
      path: PathBuf::from(format!("{}.rs", module_ident(&unit.config.package))),
      contents: output,
    }])
  }
}
