/* Per-class impl blocks: constructor, codec, size, equality, hash, dump and
 * accessors, each rendered from the class plan */

use super::helpers::{
  const_ident, doc_comment, element_type, field_ident, field_stem, field_zero, initializer_value, int_literal,
  type_ident, unsigned_twin,
};
use crate::codegen::shared::initial::numeric_text;
use crate::codegen::shared::{
  BitfieldAccessor, ClassPlan, CompareStep, DumpStep, MarshalStep, SizeTerm, StorageWrapper,
  UnmarshalStep,
};
use crate::config::GeneratorConfig;
use crate::schema::{ElementKind, FieldKind, ListLength, LiteralFormat, PrimitiveType};
use indexmap::IndexMap;
use std::fmt::{self, Write};

pub struct RustClassEmitter<'a> {
  pub config: &'a GeneratorConfig,
  pub wrappers: &'a IndexMap<String, StorageWrapper<'a>>,
}

impl<'a> RustClassEmitter<'a> {
  pub fn emit_impl(&self, out: &mut String, plan: &ClassPlan) -> fmt::Result {
    if plan.is_alias() {
      return Ok(());
    }
    let ident = type_ident(&plan.class_name);

    writeln!(out, "impl {} {{", ident)?;
    for constant in &plan.constants {
      out.push_str(&doc_comment(constant.comment.as_deref(), "  "));
      let value = match constant.value.as_integer() {
        Some(v) if constant.prim.is_integer() => int_literal(v, constant.prim),
        integer => numeric_text(&constant.value, integer, &LiteralFormat::Numeric(constant.prim)),
      };
      writeln!(
        out,
        "  pub const {}: {} = {};",
        const_ident(&constant.name),
        constant.prim.rust_type(),
        value
      )?;
    }
    if !plan.constants.is_empty() {
      writeln!(out)?;
    }

    self.emit_new(out, plan)?;
    emit_marshal(out, plan)?;
    emit_unmarshal(out, plan)?;
    emit_size(out, plan)?;
    if self.config.emit_equality {
      emit_hash(out, plan)?;
    }
    if self.config.emit_dump {
      emit_dump(out, plan)?;
    }
    if self.config.emit_bitfield_accessors {
      for accessor in &plan.bitfields {
        emit_bitfield_accessor(out, accessor)?;
      }
    }
    for field in plan.fields.iter().filter(|f| f.text_capable) {
      if let FieldKind::FixedList { element, length, .. } = &field.kind {
        emit_text_accessors(out, &field.name, element, length)?;
      }
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "impl Default for {} {{", ident)?;
    writeln!(out, "  fn default() -> Self {{")?;
    writeln!(out, "    Self::new()")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    if self.config.emit_equality {
      emit_partial_eq(out, plan)?;
    }
    Ok(())
  }

  fn emit_new(&self, out: &mut String, plan: &ClassPlan) -> fmt::Result {
    let initializers: Vec<_> = if self.config.emit_initial_values {
      plan.initializers.iter().collect()
    } else {
      Vec::new()
    };
    let binding = if initializers.is_empty() { "" } else { "mut " };

    writeln!(out, "  pub fn new() -> Self {{")?;
    writeln!(out, "    let {}value = Self {{", binding)?;
    if let Some(parent) = &plan.parent {
      writeln!(out, "      parent: {}::new(),", type_ident(parent))?;
    }
    for field in &plan.fields {
      if let Some(zero) = field_zero(&field.kind) {
        writeln!(out, "      {}: {},", field_ident(&field.name), zero)?;
      }
    }
    writeln!(out, "    }};")?;
    for init in initializers {
      let path = "parent.".repeat(init.depth);
      writeln!(
        out,
        "    value.{}{} = {};",
        path,
        field_ident(&init.field),
        initializer_value(init, self.wrappers)
      )?;
    }
    writeln!(out, "    value")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;
    Ok(())
  }
}

fn put_element(element: &ElementKind, expr: &str) -> String {
  match element {
    ElementKind::Primitive { prim } => format!("w.put_{}({});", prim.rust_type(), expr),
    ElementKind::ClassRef { .. } => format!("{}.marshal(w)?;", expr),
    ElementKind::Enum(_) | ElementKind::Bitfield(_) => format!("{}.marshal(w);", expr),
  }
}

/* Loop variable as a value for primitives, as a reference otherwise */
fn item_ref(element: &ElementKind) -> String {
  match element {
    ElementKind::Primitive { .. } => "*item".to_string(),
    _ => "item".to_string(),
  }
}

fn get_element(element: &ElementKind) -> String {
  match element {
    ElementKind::Primitive { prim } => format!("r.get_{}()?", prim.rust_type()),
    ElementKind::ClassRef { class } => format!("{}::unmarshal_from_reader(r)?", type_ident(class)),
    ElementKind::Enum(storage) | ElementKind::Bitfield(storage) => {
      format!("{}::unmarshal(r)?", type_ident(storage.type_name()))
    }
  }
}

fn emit_marshal(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  pub fn marshal(&self, w: &mut WireWriter) -> Result<(), WireError> {{")?;
  for step in &plan.marshal {
    match step {
      MarshalStep::Parent { .. } => writeln!(out, "    self.parent.marshal(w)?;")?,
      MarshalStep::Value { field, element } => {
        let expr = format!("self.{}", field_ident(field));
        writeln!(out, "    {}", put_element(element, &expr))?;
      }
      MarshalStep::LiveCount { field, prim, list } => {
        let list = field_ident(list);
        writeln!(
          out,
          "    let {}_count = {}::try_from(self.{}.len()).map_err(|_| WireError::CountOverflow {{ field: \"{}\", count: self.{}.len() }})?;",
          field_stem(field),
          prim.rust_type(),
          list,
          field,
          list
        )?;
        writeln!(out, "    w.put_{}({}_count);", prim.rust_type(), field_stem(field))?;
      }
      MarshalStep::FixedElements { field, element, .. } | MarshalStep::LiveElements { field, element } => {
        writeln!(out, "    for item in self.{}.iter() {{", field_ident(field))?;
        writeln!(out, "      {}", put_element(element, &item_ref(element)))?;
        writeln!(out, "    }}")?;
      }
      MarshalStep::Pad { bytes } => writeln!(out, "    w.put_zeros({});", bytes)?,
    }
  }
  writeln!(out, "    Ok(())")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;

  writeln!(out, "  pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {{")?;
  writeln!(out, "    let mut w = WireWriter::with_capacity(self.marshalled_size());")?;
  writeln!(out, "    self.marshal(&mut w)?;")?;
  writeln!(out, "    Ok(w.into_bytes())")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_unmarshal(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  pub fn unmarshal_from(&mut self, r: &mut WireReader<'_>) -> Result<(), WireError> {{")?;
  for step in &plan.unmarshal {
    match step {
      UnmarshalStep::Parent { .. } => writeln!(out, "    self.parent.unmarshal_from(r)?;")?,
      UnmarshalStep::Value { field, element } => {
        let target = format!("self.{}", field_ident(field));
        match element {
          ElementKind::ClassRef { .. } => writeln!(out, "    {}.unmarshal_from(r)?;", target)?,
          other => writeln!(out, "    {} = {};", target, get_element(other))?,
        }
      }
      UnmarshalStep::FixedElements { field, element, .. } => {
        writeln!(out, "    for item in self.{}.iter_mut() {{", field_ident(field))?;
        match element {
          ElementKind::ClassRef { .. } => writeln!(out, "      item.unmarshal_from(r)?;")?,
          other => writeln!(out, "      *item = {};", get_element(other))?,
        }
        writeln!(out, "    }}")?;
      }
      UnmarshalStep::CountedElements { field, element, counter } => {
        let list = field_ident(field);
        writeln!(out, "    self.{}.clear();", list)?;
        if let Some(counter) = counter {
          writeln!(out, "    for _ in 0..self.{} {{", field_ident(counter))?;
          writeln!(out, "      self.{}.push({});", list, get_element(element))?;
          writeln!(out, "    }}")?;
        }
      }
      UnmarshalStep::SkipPad { bytes } => writeln!(out, "    r.skip({})?;", bytes)?,
    }
  }
  writeln!(out, "    Ok(())")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;

  writeln!(out, "  pub fn unmarshal_from_reader(r: &mut WireReader<'_>) -> Result<Self, WireError> {{")?;
  writeln!(out, "    let mut value = Self::new();")?;
  writeln!(out, "    value.unmarshal_from(r)?;")?;
  writeln!(out, "    Ok(value)")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  writeln!(out, "  pub fn unmarshal(bytes: &[u8]) -> Result<Self, WireError> {{")?;
  writeln!(out, "    Self::unmarshal_from_reader(&mut WireReader::new(bytes))")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_size(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  pub fn marshalled_size(&self) -> usize {{")?;
  if plan.size.is_empty() {
    writeln!(out, "    0")?;
  } else {
    writeln!(out, "    let mut size = 0usize;")?;
    for term in &plan.size {
      match term {
        SizeTerm::Parent { .. } => writeln!(out, "    size += self.parent.marshalled_size();")?,
        SizeTerm::Fixed { field, bytes } => writeln!(out, "    size += {}; // {}", bytes, field)?,
        SizeTerm::Nested { field, .. } => {
          writeln!(out, "    size += self.{}.marshalled_size();", field_ident(field))?
        }
        SizeTerm::NestedElements { field, .. } => writeln!(
          out,
          "    size += self.{}.iter().map(|item| item.marshalled_size()).sum::<usize>();",
          field_ident(field)
        )?,
        SizeTerm::LiveElements { field, element_width } => writeln!(
          out,
          "    size += self.{}.len() * {};",
          field_ident(field),
          element_width
        )?,
      }
    }
    writeln!(out, "    size")?;
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

/* Floats compare by bit pattern so equality agrees with `wire_hash` */
fn is_float(element: &ElementKind) -> bool {
  matches!(element, ElementKind::Primitive { prim } if prim.is_float())
}

fn hash_term(element: &ElementKind, expr: &str) -> String {
  match element {
    ElementKind::Primitive { prim } if prim.is_float() => format!("{}.to_bits() as u64", expr),
    ElementKind::Primitive { .. } => format!("{} as u64", expr),
    ElementKind::ClassRef { .. } => format!("{}.wire_hash()", expr),
    ElementKind::Enum(_) | ElementKind::Bitfield(_) => format!("{}.0 as u64", expr),
  }
}

fn emit_hash(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  pub fn wire_hash(&self) -> u64 {{")?;
  let binding = if plan.comparison.is_empty() { "" } else { "mut " };
  writeln!(out, "    let {}acc: u64 = 17;", binding)?;
  for step in &plan.comparison {
    match step {
      CompareStep::Parent { .. } => {
        writeln!(out, "    acc = hash_combine(acc, self.parent.wire_hash());")?
      }
      CompareStep::Value { field, element } => {
        let expr = format!("self.{}", field_ident(field));
        writeln!(out, "    acc = hash_combine(acc, {});", hash_term(element, &expr))?;
      }
      CompareStep::Elements { field, element } => {
        writeln!(out, "    for item in self.{}.iter() {{", field_ident(field))?;
        writeln!(out, "      acc = hash_combine(acc, {});", hash_term(element, "(*item)"))?;
        writeln!(out, "    }}")?;
      }
    }
  }
  writeln!(out, "    acc")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_partial_eq(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ident = type_ident(&plan.class_name);
  let terms: Vec<String> = plan
    .comparison
    .iter()
    .map(|step| match step {
      CompareStep::Parent { .. } => "self.parent == other.parent".to_string(),
      CompareStep::Value { field, element } => {
        let f = field_ident(field);
        if is_float(element) {
          format!("self.{f}.to_bits() == other.{f}.to_bits()")
        } else {
          format!("self.{f} == other.{f}")
        }
      }
      CompareStep::Elements { field, element } => {
        let f = field_ident(field);
        if is_float(element) {
          format!(
            "(self.{f}.len() == other.{f}.len() && self.{f}.iter().zip(other.{f}.iter()).all(|(a, b)| a.to_bits() == b.to_bits()))"
          )
        } else {
          format!("self.{f} == other.{f}")
        }
      }
    })
    .collect();

  writeln!(out, "impl PartialEq for {} {{", ident)?;
  if terms.is_empty() {
    writeln!(out, "  fn eq(&self, _other: &Self) -> bool {{")?;
    writeln!(out, "    true")?;
  } else {
    writeln!(out, "  fn eq(&self, other: &Self) -> bool {{")?;
    writeln!(out, "    {}", terms.join("\n      && "))?;
  }
  writeln!(out, "  }}")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_dump(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  pub fn dump(&self) -> String {{")?;
  writeln!(out, "    let mut out = String::new();")?;
  writeln!(out, "    self.dump_into(&mut out, 0);")?;
  writeln!(out, "    out")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  let uses_out = !plan.dump.is_empty();
  if uses_out {
    writeln!(out, "  pub fn dump_into(&self, out: &mut String, indent: usize) {{")?;
  } else {
    writeln!(out, "  pub fn dump_into(&self, _out: &mut String, _indent: usize) {{")?;
  }
  for step in &plan.dump {
    match step {
      DumpStep::Parent { .. } => writeln!(out, "    self.parent.dump_into(out, indent);")?,
      DumpStep::Value { field, element } => {
        let f = field_ident(field);
        match element {
          ElementKind::ClassRef { .. } => {
            writeln!(out, "    let _ = writeln!(out, \"{{:indent$}}{} :\", \"\", indent = indent);", field)?;
            writeln!(out, "    self.{}.dump_into(out, indent + 2);", f)?;
          }
          _ => writeln!(
            out,
            "    let _ = writeln!(out, \"{{:indent$}}{} : {{}}\", \"\", self.{}, indent = indent);",
            field, f
          )?,
        }
      }
      DumpStep::Elements { field, element } => {
        let f = field_ident(field);
        match element {
          ElementKind::ClassRef { .. } => {
            writeln!(out, "    for (index, item) in self.{}.iter().enumerate() {{", f)?;
            writeln!(
              out,
              "      let _ = writeln!(out, \"{{:indent$}}{}[{{}}] :\", \"\", index, indent = indent);",
              field
            )?;
            writeln!(out, "      item.dump_into(out, indent + 2);")?;
            writeln!(out, "    }}")?;
          }
          ElementKind::Primitive { .. } => writeln!(
            out,
            "    let _ = writeln!(out, \"{{:indent$}}{} : {{:?}}\", \"\", self.{}, indent = indent);",
            field, f
          )?,
          ElementKind::Enum(_) | ElementKind::Bitfield(_) => writeln!(
            out,
            "    let _ = writeln!(out, \"{{:indent$}}{} : [{{}}]\", \"\", self.{}.iter().map(|item| item.to_string()).collect::<Vec<_>>().join(\", \"), indent = indent);",
            field, f
          )?,
        }
      }
      DumpStep::Text { field } => writeln!(
        out,
        "    let _ = writeln!(out, \"{{:indent$}}{} : {{:?}}\", \"\", self.{}_text(), indent = indent);",
        field,
        field_stem(field)
      )?,
    }
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn mask_literal(mask: u64, host: PrimitiveType) -> String {
  format!("{:#x}{}", mask, unsigned_twin(host))
}

fn emit_bitfield_accessor(out: &mut String, accessor: &BitfieldAccessor) -> fmt::Result {
  let host = field_ident(&accessor.host);
  let ty = accessor.host_prim.rust_type();
  let unsigned = unsigned_twin(accessor.host_prim);
  let mask = mask_literal(accessor.mask, accessor.host_prim);
  let shift = accessor.shift;
  let getter = field_ident(&accessor.name);
  let setter = format!("set_{}", field_stem(&accessor.name));

  out.push_str(&doc_comment(accessor.comment.as_deref(), "  "));
  writeln!(out, "  /// Bits `{:#x}` of `{}`.", accessor.mask, host)?;
  writeln!(out, "  pub fn {}(&self) -> {} {{", getter, ty)?;
  if accessor.host_prim.is_signed() {
    writeln!(out, "    ((self.{} as {} & {}) >> {}) as {}", host, unsigned, mask, shift, ty)?;
  } else {
    writeln!(out, "    (self.{} & {}) >> {}", host, mask, shift)?;
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;
  writeln!(out, "  pub fn {}(&mut self, value: {}) {{", setter, ty)?;
  if accessor.host_prim.is_signed() {
    writeln!(
      out,
      "    self.{} = ((self.{} as {} & !{}) | (((value as {}) << {}) & {})) as {};",
      host, host, unsigned, mask, unsigned, shift, mask, ty
    )?;
  } else {
    writeln!(
      out,
      "    self.{} = (self.{} & !{}) | ((value << {}) & {});",
      host, host, mask, shift, mask
    )?;
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_text_accessors(out: &mut String, field: &str, element: &ElementKind, length: &ListLength) -> fmt::Result {
  let f = field_ident(field);
  let stem = field_stem(field);
  let signed = element_type(element) == "i8";
  let to_byte = if signed { ".map(|b| *b as u8)" } else { ".copied()" };

  writeln!(out, "  /// `{}` read as text, up to the first NUL.", f)?;
  writeln!(out, "  pub fn {}_text(&self) -> String {{", stem)?;
  writeln!(out, "    let bytes: Vec<u8> = self.{}.iter(){}.take_while(|b| *b != 0).collect();", f, to_byte)?;
  writeln!(out, "    String::from_utf8_lossy(&bytes).into_owned()")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;

  let from_byte = if signed { "*b as i8" } else { "*b" };
  writeln!(out, "  pub fn set_{}_text(&mut self, text: &str) {{", stem)?;
  match length {
    ListLength::Literal(_) => {
      writeln!(out, "    let limit = self.{}.len().saturating_sub(1);", f)?;
      writeln!(out, "    let bytes = &text.as_bytes()[..text.len().min(limit)];")?;
      writeln!(out, "    for slot in self.{}.iter_mut() {{", f)?;
      writeln!(out, "      *slot = 0;")?;
      writeln!(out, "    }}")?;
      writeln!(out, "    for (slot, b) in self.{}.iter_mut().zip(bytes) {{", f)?;
      writeln!(out, "      *slot = {};", from_byte)?;
      writeln!(out, "    }}")?;
    }
    ListLength::Counter(_) => {
      writeln!(out, "    self.{} = text.as_bytes().iter().map(|b| {}).collect();", f, from_byte)?;
      writeln!(out, "    self.{}.push(0);", f)?;
    }
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}
