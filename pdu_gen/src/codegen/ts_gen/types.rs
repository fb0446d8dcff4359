/* Enum/bitfield storage types and alias declarations */

use super::helpers::{const_ident, int_literal, jsdoc, type_ident};
use crate::codegen::shared::{ClassPlan, StorageWrapper};
use std::fmt::{self, Write};

/* A type alias over the storage plus a const object carrying the named values */
pub fn emit_storage_type(out: &mut String, wrapper: &StorageWrapper<'_>) -> fmt::Result {
  let ident = type_ident(&wrapper.name);
  out.push_str(&jsdoc(wrapper.decl.and_then(|d| d.comment.as_deref()), ""));
  writeln!(out, "export type {} = {};", ident, wrapper.storage.ts_type())?;
  if !wrapper.values().is_empty() {
    writeln!(out)?;
    writeln!(out, "export const {} = {{", ident)?;
    for (name, value) in wrapper.values() {
      writeln!(out, "  {}: {},", const_ident(name), int_literal(*value as i128, wrapper.storage))?;
    }
    writeln!(out, "}} as const;")?;
  }
  writeln!(out)?;
  Ok(())
}

pub fn emit_alias(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let Some(target) = &plan.alias_for else {
    return Ok(());
  };
  let (ident, target) = (type_ident(&plan.class_name), type_ident(target));
  out.push_str(&jsdoc(plan.comment.as_deref(), ""));
  writeln!(out, "export type {} = {};", ident, target)?;
  writeln!(out, "export const {} = {};", ident, target)?;
  writeln!(out)?;
  Ok(())
}
