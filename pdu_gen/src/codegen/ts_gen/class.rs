/* One TypeScript class per concrete schema class, rendered from its plan */

use super::helpers::{
  const_ident, dataview_suffix, element_type, field_ident, field_type, field_zero, initializer_value, int_literal,
  is_bigint, jsdoc, method_stem, type_ident,
};
use crate::codegen::shared::initial::numeric_text;
use crate::codegen::shared::{
  BitfieldAccessor, ClassPlan, CompareStep, DumpStep, FieldPlan, MarshalStep, SizeTerm, StorageWrapper,
  UnmarshalStep,
};
use crate::config::GeneratorConfig;
use crate::schema::{ElementKind, FieldKind, ListLength, LiteralFormat, PrimitiveType};
use indexmap::IndexMap;
use std::fmt::{self, Write};

pub struct TsClassEmitter<'a> {
  pub config: &'a GeneratorConfig,
  pub wrappers: &'a IndexMap<String, StorageWrapper<'a>>,
}

impl<'a> TsClassEmitter<'a> {
  pub fn emit_class(&self, out: &mut String, plan: &ClassPlan) -> fmt::Result {
    if plan.is_alias() {
      return Ok(());
    }
    let ident = type_ident(&plan.class_name);
    let keyword = if plan.is_abstract { "export abstract class" } else { "export class" };

    out.push_str(&jsdoc(plan.comment.as_deref(), ""));
    match &plan.parent {
      Some(parent) => writeln!(out, "{} {} extends {} {{", keyword, ident, type_ident(parent))?,
      None => writeln!(out, "{} {} {{", keyword, ident)?,
    }

    for constant in &plan.constants {
      out.push_str(&jsdoc(constant.comment.as_deref(), "  "));
      let value = match constant.value.as_integer() {
        Some(v) if constant.prim.is_integer() => int_literal(v, constant.prim),
        integer => numeric_text(&constant.value, integer, &LiteralFormat::Numeric(constant.prim)),
      };
      writeln!(
        out,
        "  static readonly {}: {} = {};",
        const_ident(&constant.name),
        constant.prim.ts_type(),
        value
      )?;
    }
    if !plan.constants.is_empty() {
      writeln!(out)?;
    }

    for field in plan.stored_fields() {
      let (Some(ty), Some(zero)) = (field_type(&field.kind), field_zero(&field.kind)) else {
        continue;
      };
      out.push_str(&jsdoc(field.comment.as_deref(), "  "));
      writeln!(out, "  {}: {} = {};", field_ident(&field.name), ty, zero)?;
    }
    if plan.stored_fields().next().is_some() {
      writeln!(out)?;
    }

    self.emit_constructor(out, plan)?;
    emit_marshal(out, plan)?;
    emit_unmarshal(out, plan)?;
    emit_size(out, plan)?;
    if self.config.emit_equality {
      emit_equals(out, plan)?;
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
      emit_text_accessors(out, field)?;
    }

    while out.ends_with("\n\n") {
      out.pop();
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
  }

  fn emit_constructor(&self, out: &mut String, plan: &ClassPlan) -> fmt::Result {
    if !self.config.emit_initial_values || plan.initializers.is_empty() {
      return Ok(());
    }
    writeln!(out, "  constructor() {{")?;
    if plan.parent.is_some() {
      writeln!(out, "    super();")?;
    }
    for init in &plan.initializers {
      writeln!(
        out,
        "    this.{} = {};",
        field_ident(&init.field),
        initializer_value(init, self.wrappers)
      )?;
    }
    writeln!(out, "  }}")?;
    writeln!(out)?;
    Ok(())
  }
}

fn put_element(element: &ElementKind, expr: &str) -> String {
  match element {
    ElementKind::ClassRef { .. } => format!("{}.marshal(out);", expr),
    other => match other.storage_primitive() {
      Some(prim) => format!("out.write{}({});", dataview_suffix(prim), expr),
      None => String::new(),
    },
  }
}

fn read_element(element: &ElementKind) -> String {
  match element.storage_primitive() {
    Some(prim) => format!("inp.read{}()", dataview_suffix(prim)),
    None => String::new(),
  }
}

fn emit_marshal(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  marshal(out: OutputStream): void {{")?;
  for step in &plan.marshal {
    match step {
      MarshalStep::Parent { .. } => writeln!(out, "    super.marshal(out);")?,
      MarshalStep::Value { field, element } => {
        writeln!(out, "    {}", put_element(element, &format!("this.{}", field_ident(field))))?
      }
      MarshalStep::LiveCount { field, prim, list } => {
        let len = format!("this.{}.length", field_ident(list));
        if is_bigint(*prim) {
          writeln!(out, "    out.write{}(BigInt({}));", dataview_suffix(*prim), len)?;
        } else {
          writeln!(
            out,
            "    out.write{}(checkCount({}, {}, \"{}\"));",
            dataview_suffix(*prim),
            len,
            prim.max_count(),
            field
          )?;
        }
      }
      MarshalStep::FixedElements { field, element, .. } | MarshalStep::LiveElements { field, element } => {
        writeln!(out, "    for (const item of this.{}) {{", field_ident(field))?;
        writeln!(out, "      {}", put_element(element, "item"))?;
        writeln!(out, "    }}")?;
      }
      MarshalStep::Pad { bytes } => writeln!(out, "    out.writeZeros({});", bytes)?,
    }
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;

  if plan.parent.is_none() {
    writeln!(out, "  toBytes(): Uint8Array {{")?;
    writeln!(out, "    const out = new OutputStream(this.getMarshalledSize());")?;
    writeln!(out, "    this.marshal(out);")?;
    writeln!(out, "    return out.toBytes();")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;
  }
  Ok(())
}

fn emit_unmarshal(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  unmarshal(inp: InputStream): void {{")?;
  for step in &plan.unmarshal {
    match step {
      UnmarshalStep::Parent { .. } => writeln!(out, "    super.unmarshal(inp);")?,
      UnmarshalStep::Value { field, element } => {
        let f = field_ident(field);
        match element {
          ElementKind::ClassRef { .. } => writeln!(out, "    this.{}.unmarshal(inp);", f)?,
          other => writeln!(out, "    this.{} = {};", f, read_element(other))?,
        }
      }
      UnmarshalStep::FixedElements { field, element, count } => {
        let f = field_ident(field);
        writeln!(out, "    for (let i = 0; i < {}; i++) {{", count)?;
        match element {
          ElementKind::ClassRef { .. } => writeln!(out, "      this.{}[i].unmarshal(inp);", f)?,
          other => writeln!(out, "      this.{}[i] = {};", f, read_element(other))?,
        }
        writeln!(out, "    }}")?;
      }
      UnmarshalStep::CountedElements { field, element, counter } => {
        let f = field_ident(field);
        writeln!(out, "    this.{} = [];", f)?;
        if let Some(counter) = counter {
          writeln!(out, "    for (let i = 0; i < Number(this.{}); i++) {{", field_ident(counter))?;
          match element {
            ElementKind::ClassRef { class } => {
              writeln!(out, "      const item = new {}();", type_ident(class))?;
              writeln!(out, "      item.unmarshal(inp);")?;
              writeln!(out, "      this.{}.push(item);", f)?;
            }
            other => writeln!(out, "      this.{}.push({});", f, read_element(other))?,
          }
          writeln!(out, "    }}")?;
        }
      }
      UnmarshalStep::SkipPad { bytes } => writeln!(out, "    inp.skip({});", bytes)?,
    }
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_size(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  getMarshalledSize(): number {{")?;
  writeln!(out, "    let size = 0;")?;
  for term in &plan.size {
    match term {
      SizeTerm::Parent { .. } => writeln!(out, "    size += super.getMarshalledSize();")?,
      SizeTerm::Fixed { field, bytes } => writeln!(out, "    size += {}; // {}", bytes, field)?,
      SizeTerm::Nested { field, .. } => {
        writeln!(out, "    size += this.{}.getMarshalledSize();", field_ident(field))?
      }
      SizeTerm::NestedElements { field, .. } => {
        writeln!(out, "    for (const item of this.{}) {{", field_ident(field))?;
        writeln!(out, "      size += item.getMarshalledSize();")?;
        writeln!(out, "    }}")?;
      }
      SizeTerm::LiveElements { field, element_width } => {
        writeln!(out, "    size += this.{}.length * {};", field_ident(field), element_width)?
      }
    }
  }
  writeln!(out, "    return size;")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn differs(element: &ElementKind, a: &str, b: &str) -> String {
  match element {
    ElementKind::ClassRef { .. } => format!("!{}.equals({})", a, b),
    ElementKind::Primitive { prim } if prim.is_float() => format!("!Object.is({}, {})", a, b),
    _ => format!("{} !== {}", a, b),
  }
}

fn emit_equals(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  let ident = type_ident(&plan.class_name);
  writeln!(out, "  equals(other: {}): boolean {{", ident)?;
  for step in &plan.comparison {
    match step {
      CompareStep::Parent { .. } => writeln!(out, "    if (!super.equals(other)) return false;")?,
      CompareStep::Value { field, element } => {
        let f = field_ident(field);
        let (a, b) = (format!("this.{}", f), format!("other.{}", f));
        writeln!(out, "    if ({}) return false;", differs(element, &a, &b))?;
      }
      CompareStep::Elements { field, element } => {
        let f = field_ident(field);
        writeln!(out, "    if (this.{}.length !== other.{}.length) return false;", f, f)?;
        writeln!(out, "    for (let i = 0; i < this.{}.length; i++) {{", f)?;
        let (a, b) = (format!("this.{}[i]", f), format!("other.{}[i]", f));
        writeln!(out, "      if ({}) return false;", differs(element, &a, &b))?;
        writeln!(out, "    }}")?;
      }
    }
  }
  writeln!(out, "    return true;")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn hash_term(element: &ElementKind, expr: &str) -> String {
  match element {
    ElementKind::ClassRef { .. } => format!("{}.hashCode()", expr),
    ElementKind::Primitive { prim } if prim.is_float() => format!("hashFloat({})", expr),
    other => match other.storage_primitive() {
      Some(prim) if is_bigint(prim) => format!("hashBigInt({})", expr),
      _ => format!("{} | 0", expr),
    },
  }
}

fn emit_hash(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  hashCode(): number {{")?;
  let binding = if plan.comparison.is_empty() { "const" } else { "let" };
  writeln!(out, "    {} acc = 17;", binding)?;
  for step in &plan.comparison {
    match step {
      CompareStep::Parent { .. } => writeln!(out, "    acc = hashCombine(acc, super.hashCode());")?,
      CompareStep::Value { field, element } => {
        let expr = format!("this.{}", field_ident(field));
        writeln!(out, "    acc = hashCombine(acc, {});", hash_term(element, &expr))?;
      }
      CompareStep::Elements { field, element } => {
        writeln!(out, "    for (const item of this.{}) {{", field_ident(field))?;
        writeln!(out, "      acc = hashCombine(acc, {});", hash_term(element, "item"))?;
        writeln!(out, "    }}")?;
      }
    }
  }
  writeln!(out, "    return acc;")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_dump(out: &mut String, plan: &ClassPlan) -> fmt::Result {
  writeln!(out, "  dump(indent = 0): string {{")?;
  writeln!(out, "    const pad = \" \".repeat(indent);")?;
  writeln!(out, "    let text = \"\";")?;
  for step in &plan.dump {
    match step {
      DumpStep::Parent { .. } => writeln!(out, "    text += super.dump(indent);")?,
      DumpStep::Value { field, element } => {
        let f = field_ident(field);
        match element {
          ElementKind::ClassRef { .. } => {
            writeln!(out, "    text += `${{pad}}{} :\\n`;", field)?;
            writeln!(out, "    text += this.{}.dump(indent + 2);", f)?;
          }
          _ => writeln!(out, "    text += `${{pad}}{} : ${{this.{}}}\\n`;", field, f)?,
        }
      }
      DumpStep::Elements { field, element } => {
        let f = field_ident(field);
        match element {
          ElementKind::ClassRef { .. } => {
            writeln!(out, "    this.{}.forEach((item, index) => {{", f)?;
            writeln!(out, "      text += `${{pad}}{}[${{index}}] :\\n`;", field)?;
            writeln!(out, "      text += item.dump(indent + 2);")?;
            writeln!(out, "    }});")?;
          }
          _ => writeln!(out, "    text += `${{pad}}{} : [${{this.{}.join(\", \")}}]\\n`;", field, f)?,
        }
      }
      DumpStep::Text { field } => writeln!(
        out,
        "    text += `${{pad}}{} : ${{JSON.stringify(this.get{}Text())}}\\n`;",
        field,
        method_stem(field)
      )?,
    }
  }
  writeln!(out, "    return text;")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

/* Two's complement normalization of a 32-bit JS bitwise result to `prim` */
fn normalize(expr: &str, prim: PrimitiveType) -> String {
  match (prim.is_signed(), prim.bits()) {
    (false, 32) => format!("({}) >>> 0", expr),
    (false, _) => expr.to_string(),
    (true, 32) => format!("({}) | 0", expr),
    (true, bits) => format!("(({}) << {}) >> {}", expr, 32 - bits, 32 - bits),
  }
}

fn emit_bitfield_accessor(out: &mut String, accessor: &BitfieldAccessor) -> fmt::Result {
  let host = field_ident(&accessor.host);
  let prim = accessor.host_prim;
  let ty = prim.ts_type();
  let stem = method_stem(&accessor.name);
  let shift = accessor.shift;

  out.push_str(&jsdoc(accessor.comment.as_deref(), "  "));
  writeln!(out, "  get{}(): {} {{", stem, ty)?;
  if is_bigint(prim) {
    let wrap = if prim.is_signed() { "asIntN" } else { "asUintN" };
    writeln!(
      out,
      "    return BigInt.{}(64, (BigInt.asUintN(64, this.{}) & {:#x}n) >> {}n);",
      wrap, host, accessor.mask, shift
    )?;
  } else {
    let raw = format!("(this.{} & {:#x}) >>> {}", host, accessor.mask, shift);
    writeln!(out, "    return {};", normalize(&raw, prim))?;
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;

  writeln!(out, "  set{}(value: {}): void {{", stem, ty)?;
  if is_bigint(prim) {
    let wrap = if prim.is_signed() { "asIntN" } else { "asUintN" };
    writeln!(
      out,
      "    this.{} = BigInt.{}(64, (BigInt.asUintN(64, this.{}) & ~{:#x}n) | ((BigInt.asUintN(64, value) << {}n) & {:#x}n));",
      host, wrap, host, accessor.mask, shift, accessor.mask
    )?;
  } else {
    let raw = format!(
      "(this.{} & ~{:#x}) | ((value << {}) & {:#x})",
      host, accessor.mask, shift, accessor.mask
    );
    writeln!(out, "    this.{} = {};", host, normalize(&raw, prim))?;
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}

fn emit_text_accessors(out: &mut String, field: &FieldPlan) -> fmt::Result {
  let FieldKind::FixedList { element, length, .. } = &field.kind else {
    return Ok(());
  };
  let f = field_ident(&field.name);
  let stem = method_stem(&field.name);
  let signed = element_type(element) == "number" && element.storage_primitive().is_some_and(|p| p.is_signed());
  let from_byte = if signed { "(b << 24) >> 24" } else { "b" };

  writeln!(out, "  /** `{}` read as text, up to the first NUL. */", f)?;
  writeln!(out, "  get{}Text(): string {{", stem)?;
  writeln!(out, "    const end = this.{}.indexOf(0);", f)?;
  writeln!(out, "    const bytes = end < 0 ? this.{} : this.{}.slice(0, end);", f, f)?;
  writeln!(out, "    return new TextDecoder().decode(Uint8Array.from(bytes, (b) => b & 0xff));")?;
  writeln!(out, "  }}")?;
  writeln!(out)?;

  writeln!(out, "  set{}Text(text: string): void {{", stem)?;
  writeln!(out, "    const encoded = new TextEncoder().encode(text);")?;
  match length {
    ListLength::Literal(count) => {
      writeln!(out, "    this.{}.fill(0);", f)?;
      writeln!(out, "    encoded.slice(0, {}).forEach((b, i) => {{", count.saturating_sub(1))?;
      writeln!(out, "      this.{}[i] = {};", f, from_byte)?;
      writeln!(out, "    }});")?;
    }
    ListLength::Counter(_) => {
      writeln!(out, "    this.{} = Array.from(encoded, (b) => {});", f, from_byte)?;
      writeln!(out, "    this.{}.push(0);", f)?;
    }
  }
  writeln!(out, "  }}")?;
  writeln!(out)?;
  Ok(())
}
