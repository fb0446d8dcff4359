use crate::codegen::shared::collect_storage_types;
use crate::codegen::ts_gen::{TsClassEmitter, emit_alias, emit_runtime, emit_storage_type};
use crate::codegen::{Backend, GeneratedFile, GenerationUnit, Language};
use crate::error::CodegenError;
use crate::schema::EmissionOrdering;
use std::fmt::Write;
use std::path::PathBuf;

/* Emits one `<stem>.ts` module */
pub struct TypeScriptBackend;

impl Backend for TypeScriptBackend {
  fn language(&self) -> Language {
    Language::TypeScript
  }

  /* `extends` needs the base class evaluated first */
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
      emit_storage_type(&mut output, wrapper)?;
    }

    let emitter = TsClassEmitter {
      config: unit.config,
      wrappers: &wrappers,
    };
    for name in &unit.order {
      let plan = unit.plan(name)?;
      emit_alias(&mut output, plan)?;
      emitter.emit_class(&mut output, plan)?;
    }

    while output.ends_with("\n\n") {
      output.pop();
    }

    Ok(vec![GeneratedFile {
      path: PathBuf::from(format!("{}.ts", unit.config.file_stem())),
      contents: output,
    }])
  }
}
