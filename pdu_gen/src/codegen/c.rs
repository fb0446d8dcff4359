use crate::codegen::c_gen::helpers::guard_macro;
use crate::codegen::c_gen::{
  CClassEmitter, emit_forward_declarations, emit_prototypes, emit_runtime_decls, emit_runtime_defs,
  emit_storage_typedef, emit_struct, emit_wrapper_functions,
};
use crate::codegen::shared::{ClassPlan, collect_storage_types};
use crate::codegen::{Backend, GeneratedFile, GenerationUnit, Language};
use crate::error::CodegenError;
use crate::schema::EmissionOrdering;
use std::fmt::Write;
use std::path::PathBuf;

/* Emits a `<stem>.h` / `<stem>.c` pair */
pub struct CBackend;

impl Backend for CBackend {
  fn language(&self) -> Language {
    Language::C
  }

  /* Struct members embed their types by value */
  fn ordering(&self) -> EmissionOrdering {
    EmissionOrdering::DefinitionsFirst
  }

  fn render(&self, unit: &GenerationUnit) -> Result<Vec<GeneratedFile>, CodegenError> {
    let wrappers = collect_storage_types(unit.schema)?;
    let plans: Vec<&ClassPlan> = unit.order.iter().map(|name| unit.plan(name)).collect::<Result<_, _>>()?;
    let stem = unit.config.file_stem();
    let guard = guard_macro(&unit.config.package);

    let mut header = String::new();
    writeln!(header, "/* Generated by pdu-gen from package `{}`. Do not edit. */", unit.config.package)?;
    writeln!(header)?;
    writeln!(header, "#ifndef {}", guard)?;
    writeln!(header, "#define {}", guard)?;
    writeln!(header)?;
    writeln!(header, "#include <stddef.h>")?;
    writeln!(header, "#include <stdint.h>")?;
    writeln!(header, "#include <stdio.h>")?;
    writeln!(header)?;
    writeln!(header, "#ifdef __cplusplus")?;
    writeln!(header, "extern \"C\" {{")?;
    writeln!(header, "#endif")?;
    writeln!(header)?;
    emit_runtime_decls(&mut header)?;
    for wrapper in wrappers.values() {
      emit_storage_typedef(&mut header, wrapper)?;
    }
    emit_forward_declarations(&mut header, &plans)?;
    for plan in &plans {
      emit_struct(&mut header, plan)?;
    }
    for plan in &plans {
      emit_prototypes(&mut header, plan, unit.config)?;
    }
    writeln!(header, "#ifdef __cplusplus")?;
    writeln!(header, "}}")?;
    writeln!(header, "#endif")?;
    writeln!(header)?;
    writeln!(header, "#endif /* {} */", guard)?;

    let mut source = String::new();
    writeln!(source, "/* Generated by pdu-gen from package `{}`. Do not edit. */", unit.config.package)?;
    writeln!(source)?;
    writeln!(source, "#include \"{}.h\"", stem)?;
    writeln!(source)?;
    writeln!(source, "#include <inttypes.h>")?;
    writeln!(source, "#include <stdlib.h>")?;
    writeln!(source, "#include <string.h>")?;
    writeln!(source)?;
    emit_runtime_defs(&mut source, unit.config)?;
    for wrapper in wrappers.values() {
      emit_wrapper_functions(&mut source, wrapper)?;
    }
    let emitter = CClassEmitter {
      config: unit.config,
      wrappers: &wrappers,
    };
    for plan in &plans {
      emitter.emit_functions(&mut source, plan)?;
    }
    while source.ends_with("\n\n") {
      source.pop();
    }

    Ok(vec![
      GeneratedFile {
        path: PathBuf::from(format!("{}.h", stem)),
        contents: header,
      },
      GeneratedFile {
        path: PathBuf::from(format!("{}.c", stem)),
        contents: source,
      },
    ])
  }
}
