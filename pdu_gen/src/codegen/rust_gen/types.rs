/* Type declarations: storage wrappers, class structs and aliases */

use super::helpers::{const_ident, doc_comment, field_ident, field_type, int_literal, type_ident};
use crate::codegen::shared::{ClassPlan, StorageWrapper};
use std::fmt::{self, Write};

/* Enum and packed-bitfield types become transparent newtypes so unknown
 * wire values survive a round trip */
pub fn emit_storage_wrapper(out: &mut String, wrapper: &StorageWrapper<'_>) -> fmt::Result {
  let ident = type_ident(&wrapper.name);
  let ty = wrapper.storage.rust_type();
  let width = wrapper.storage.width();

  match wrapper.decl.and_then(|d| d.comment.as_deref()) {
    Some(comment) => out.push_str(&doc_comment(Some(comment), "")),
    None if wrapper.is_bitfield => writeln!(out, "/// Packed bitfield record stored as `{}`.", ty)?,
    None => writeln!(out, "/// Enumeration stored as `{}`.", ty)?,
  }
  writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]")?;
  writeln!(out, "pub struct {}(pub {});", ident, ty)?;
  writeln!(out)?;
  writeln!(out, "impl {} {{", ident)?;
  for (name, value) in wrapper.values() {
    writeln!(
      out,
      "  pub const {}: {} = {}({});",
      const_ident(name),
      ident,
      ident,
      int_literal(*value as i128, wrapper.storage)
    )?;
  }
  writeln!(out, "  pub const MARSHALLED_SIZE: usize = {};", width)?;
  writeln!(out)?;
  writeln!(out, "  pub fn marshal(&self, w: &mut WireWriter) {{")?;
  writeln!(out, "    w.put_{}(self.0);", ty)?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  writeln!(out, "  pub fn unmarshal(r: &mut WireReader<'_>) -> Result<Self, WireError> {{")?;
  writeln!(out, "    Ok(Self(r.get_{}()?))", ty)?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  writeln!(out, "  pub fn name(&self) -> Option<&'static str> {{")?;
  if wrapper.values().is_empty() {
    writeln!(out, "    None")?;
  } else {
    writeln!(out, "    match *self {{")?;
    for (name, _) in wrapper.values() {
      writeln!(out, "      Self::{} => Some(\"{}\"),", const_ident(name), name)?;
    }
    writeln!(out, "      _ => None,")?;
    writeln!(out, "    }}")?;
  }
  writeln!(out, "  }}")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  writeln!(out, "impl fmt::Display for {} {{", ident)?;
  writeln!(out, "  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{")?;
  writeln!(out, "    match self.name() {{")?;
  writeln!(out, "      Some(name) => write!(f, \"{{}} ({{}})\", name, self.0),")?;
  writeln!(out, "      None => write!(f, \"{{}}\", self.0),")?;
  writeln!(out, "    }}")?;
  writeln!(out, "  }}")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

pub fn emit_struct(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ident = type_ident(&plan.class_name);

  if let Some(target) = &plan.alias_for {
    out.push_str(&doc_comment(plan.comment.as_deref(), ""));
    writeln!(out, "pub type {} = {};", ident, type_ident(target))?;
    writeln!(out)?;
    return Ok(());
  }

  out.push_str(&doc_comment(plan.comment.as_deref(), ""));
  if plan.is_abstract {
    if plan.comment.is_some() {
      writeln!(out, "///")?;
    }
    writeln!(out, "/// Abstract: only decoded as the parent view of a subclass.")?;
  }
  writeln!(out, "#[derive(Debug, Clone)]")?;
  writeln!(out, "pub struct {} {{", ident)?;
  if let Some(parent) = &plan.parent {
    writeln!(out, "  pub parent: {},", type_ident(parent))?;
  }
  for field in &plan.fields {
    let Some(ty) = field_type(&field.kind) else {
      continue;
    };
    out.push_str(&doc_comment(field.comment.as_deref(), "  "));
    if let Some(list) = &field.counter_for {
      writeln!(out, "  /// Written as the length of `{}`.", field_ident(list))?;
    }
    if !field.serialize {
      writeln!(out, "  /// Not serialized.")?;
    }
    writeln!(out, "  pub {}: {},", field_ident(&field.name), ty)?;
  }
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}
