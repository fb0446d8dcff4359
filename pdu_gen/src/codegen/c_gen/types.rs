/* Header declarations: storage typedefs, structs, aliases and prototypes */

use super::helpers::{
  c_comment, constant_name, element_c_type, field_ident, fn_prefix, int_literal, sanitize, type_name,
};
use crate::codegen::shared::{ClassPlan, FieldPlan, StorageWrapper};
use crate::config::GeneratorConfig;
use crate::schema::{FieldKind, ListLength};
use std::fmt::{self, Write};

/* How a list field is stored in the generated struct */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
  Array(u64),
  Buffer,
}

pub fn list_shape(kind: &FieldKind) -> Option<ListShape> {
  match kind {
    FieldKind::FixedList { length: ListLength::Literal(count), .. } => Some(ListShape::Array(*count)),
    FieldKind::FixedList { .. } | FieldKind::DynamicList { .. } => Some(ListShape::Buffer),
    _ => None,
  }
}

pub fn field_shape(plan: &ClassPlan, field: &str) -> Option<ListShape> {
  plan.field(field).and_then(|f| list_shape(&f.kind))
}

pub fn emit_forward_declarations(out: &mut String, plans: &[&ClassPlan]) -> fmt::Result {
  for plan in plans.iter().filter(|p| !p.is_alias()) {
    let name = fn_prefix(&plan.class_name);
    writeln!(out, "typedef struct {} {};", name, type_name(&plan.class_name))?;
  }
  writeln!(out)?;
  Ok(())
}

/* Enums and packed bitfields are plain typedefs of their storage so that
   unknown wire values survive a round trip */
pub fn emit_storage_typedef(out: &mut String, wrapper: &StorageWrapper<'_>) -> fmt::Result {
  let ty = type_name(&wrapper.name);
  out.push_str(&c_comment(wrapper.decl.and_then(|d| d.comment.as_deref()), ""));
  writeln!(out, "typedef {} {};", wrapper.storage.c_type(), ty)?;
  for (variant, value) in wrapper.values() {
    writeln!(
      out,
      "#define {} (({}){})",
      constant_name(&wrapper.name, variant),
      ty,
      int_literal(*value as i128, wrapper.storage)
    )?;
  }
  if !wrapper.values().is_empty() {
    let prefix = fn_prefix(&wrapper.name);
    writeln!(out, "char const * {}_name( {} value );", prefix, ty)?;
  }
  writeln!(out)?;
  Ok(())
}

fn emit_member(out: &mut String, field: &FieldPlan) -> fmt::Result {
  let ident = field_ident(&field.name);
  out.push_str(&c_comment(field.comment.as_deref(), "  "));
  match &field.kind {
    FieldKind::Primitive { prim } => writeln!(out, "  {} {};", prim.c_type(), ident)?,
    FieldKind::ClassRef { class } => writeln!(out, "  {} {};", type_name(class), ident)?,
    FieldKind::Enum(storage) | FieldKind::Bitfield(storage) => {
      writeln!(out, "  {} {};", type_name(storage.type_name()), ident)?
    }
    FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => {
      match list_shape(&field.kind) {
        Some(ListShape::Array(count)) => writeln!(out, "  {} {}[{}];", element_c_type(element), ident, count)?,
        _ => {
          writeln!(out, "  {} * {};", element_c_type(element), ident)?;
          writeln!(out, "  size_t {}_len;", ident)?;
        }
      }
    }
    FieldKind::StaticValue { .. } | FieldKind::Pad { .. } => {}
  }
  Ok(())
}

pub fn emit_struct(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ty = type_name(&plan.class_name);

  if let Some(target) = &plan.alias_for {
    out.push_str(&c_comment(plan.comment.as_deref(), ""));
    writeln!(out, "typedef {} {};", type_name(target), ty)?;
    let (alias, original) = (fn_prefix(&plan.class_name), fn_prefix(target));
    for suffix in ALIAS_FUNCTIONS {
      writeln!(out, "#define {}_{} {}_{}", alias, suffix, original, suffix)?;
    }
    writeln!(out)?;
    return Ok(());
  }

  out.push_str(&c_comment(plan.comment.as_deref(), ""));
  if plan.is_abstract {
    writeln!(out, "/* Abstract: only decoded as the parent view of a subclass */")?;
  }
  writeln!(out, "struct {} {{", fn_prefix(&plan.class_name))?;
  let mut members = 0usize;
  if let Some(parent) = &plan.parent {
    writeln!(out, "  {} parent;", type_name(parent))?;
    members += 1;
  }
  for field in plan.stored_fields() {
    if list_shape(&field.kind) == Some(ListShape::Array(0)) {
      continue;
    }
    emit_member(out, field)?;
    members += 1;
  }
  /* ISO C forbids empty structs */
  if members == 0 {
    writeln!(out, "  uint8_t unused_;")?;
  }
  writeln!(out, "}};")?;
  writeln!(out)?;
  Ok(())
}

const ALIAS_FUNCTIONS: &[&str] = &[
  "init", "free", "marshal", "unmarshal", "marshalled_size", "equals", "hash", "dump",
];

pub fn emit_prototypes(out: &mut String, plan: &ClassPlan, config: &GeneratorConfig) -> fmt::Result {
  if plan.is_alias() {
    return Ok(());
  }
  let ty = type_name(&plan.class_name);
  let name = fn_prefix(&plan.class_name);

  writeln!(out, "void   {}_init( {} * self );", name, ty)?;
  writeln!(out, "void   {}_free( {} * self );", name, ty)?;
  writeln!(out, "int    {}_marshal( {} const * self, pdu_writer_t * w );", name, ty)?;
  writeln!(out, "int    {}_unmarshal( {} * self, pdu_reader_t * r );", name, ty)?;
  writeln!(out, "size_t {}_marshalled_size( {} const * self );", name, ty)?;
  if config.emit_equality {
    writeln!(out, "int    {}_equals( {} const * a, {} const * b );", name, ty, ty)?;
    writeln!(out, "uint64_t {}_hash( {} const * self );", name, ty)?;
  }
  if config.emit_dump {
    writeln!(out, "void   {}_dump( {} const * self, FILE * out, int indent );", name, ty)?;
  }
  if config.emit_bitfield_accessors {
    for accessor in &plan.bitfields {
      let value_ty = accessor.host_prim.c_type();
      let field = field_ident(&accessor.name);
      writeln!(out, "{} {}_get_{}( {} const * self );", value_ty, name, field, ty)?;
      writeln!(out, "void {}_set_{}( {} * self, {} value );", name, field, ty, value_ty)?;
    }
  }
  for field in plan.fields.iter().filter(|f| f.text_capable) {
    let field = field_ident(&field.name);
    writeln!(out, "size_t {}_get_{}_text( {} const * self, char * buf, size_t cap );", name, field, ty)?;
    writeln!(out, "int    {}_set_{}_text( {} * self, char const * text );", name, field, ty)?;
  }
  for constant in &plan.constants {
    out.push_str(&c_comment(constant.comment.as_deref(), ""));
    writeln!(
      out,
      "extern {} const {}_{};",
      constant.prim.c_type(),
      name,
      sanitize(&constant.name)
    )?;
  }
  writeln!(out)?;
  Ok(())
}
