/* Helper utilities for TypeScript code generation */

use crate::codegen::shared::initial::numeric_text;
use crate::codegen::shared::{Initializer, StorageWrapper};
use crate::schema::{ElementKind, FieldKind, ListLength, LiteralFormat, PrimitiveType};
use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToUpperCamelCase};
use indexmap::IndexMap;
use pdu_types::Literal;

/* Reserved words plus the member names every generated class defines */
const TS_RESERVED: &[&str] = &[
  "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
  "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
  "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
  "typeof", "var", "void", "while", "with", "as", "implements", "interface", "let", "package",
  "private", "protected", "public", "static", "yield", "constructor", "marshal", "unmarshal",
  "equals", "hashCode", "dump", "getMarshalledSize", "toBytes",
];

fn guard(name: String, prefix: &str) -> String {
  let name = match name.chars().next() {
    Some(c) if c.is_ascii_digit() => format!("{}{}", prefix, name),
    None => prefix.to_string(),
    _ => name,
  };
  if TS_RESERVED.contains(&name.as_str()) {
    format!("{}_", name)
  } else {
    name
  }
}

pub fn type_ident(name: &str) -> String {
  guard(name.to_upper_camel_case(), "T")
}

pub fn field_ident(name: &str) -> String {
  guard(name.to_lower_camel_case(), "f")
}

/* `marking` -> `Marking`, for `getMarking` / `setMarkingText` style names */
pub fn method_stem(name: &str) -> String {
  let stem = name.to_upper_camel_case();
  if stem.is_empty() { "F".to_string() } else { stem }
}

pub fn const_ident(name: &str) -> String {
  let ident = name.to_shouty_snake_case();
  match ident.chars().next() {
    Some(c) if c.is_ascii_digit() => format!("_{}", ident),
    None => "_".to_string(),
    _ => ident,
  }
}

/* DataView accessor suffix: `Uint16`, `BigInt64`, `Float32` */
pub fn dataview_suffix(prim: PrimitiveType) -> &'static str {
  match prim {
    PrimitiveType::Uint8 => "Uint8",
    PrimitiveType::Uint16 => "Uint16",
    PrimitiveType::Uint32 => "Uint32",
    PrimitiveType::Uint64 => "BigUint64",
    PrimitiveType::Int8 => "Int8",
    PrimitiveType::Int16 => "Int16",
    PrimitiveType::Int32 => "Int32",
    PrimitiveType::Int64 => "BigInt64",
    PrimitiveType::Float32 => "Float32",
    PrimitiveType::Float64 => "Float64",
  }
}

pub fn is_bigint(prim: PrimitiveType) -> bool {
  prim.ts_type() == "bigint"
}

/* Reduce `value` to the range of `prim` the way a two's complement store would */
pub fn wrap_integer(value: i128, prim: PrimitiveType) -> i128 {
  match prim {
    PrimitiveType::Uint8 => value as u8 as i128,
    PrimitiveType::Uint16 => value as u16 as i128,
    PrimitiveType::Uint32 => value as u32 as i128,
    PrimitiveType::Uint64 => value as u64 as i128,
    PrimitiveType::Int8 => value as i8 as i128,
    PrimitiveType::Int16 => value as i16 as i128,
    PrimitiveType::Int32 => value as i32 as i128,
    PrimitiveType::Int64 => value as i64 as i128,
    PrimitiveType::Float32 | PrimitiveType::Float64 => value,
  }
}

pub fn int_literal(value: i128, prim: PrimitiveType) -> String {
  let value = wrap_integer(value, prim);
  if is_bigint(prim) { format!("{}n", value) } else { value.to_string() }
}

pub fn zero_literal(prim: PrimitiveType) -> &'static str {
  if is_bigint(prim) { "0n" } else { "0" }
}

pub fn element_type(element: &ElementKind) -> String {
  match element {
    ElementKind::Primitive { prim } => prim.ts_type().to_string(),
    ElementKind::ClassRef { class } => type_ident(class),
    ElementKind::Enum(storage) | ElementKind::Bitfield(storage) => type_ident(storage.type_name()),
  }
}

pub fn element_zero(element: &ElementKind) -> String {
  match element {
    ElementKind::ClassRef { class } => format!("new {}()", type_ident(class)),
    other => other.storage_primitive().map(zero_literal).unwrap_or("0").to_string(),
  }
}

pub fn field_type(kind: &FieldKind) -> Option<String> {
  match kind {
    FieldKind::Primitive { prim } => Some(prim.ts_type().to_string()),
    FieldKind::ClassRef { class } => Some(type_ident(class)),
    FieldKind::Enum(storage) | FieldKind::Bitfield(storage) => Some(type_ident(storage.type_name())),
    FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => {
      Some(format!("{}[]", element_type(element)))
    }
    FieldKind::StaticValue { .. } | FieldKind::Pad { .. } => None,
  }
}

pub fn field_zero(kind: &FieldKind) -> Option<String> {
  match kind {
    FieldKind::FixedList { element, length: ListLength::Literal(count), .. } => Some(match element {
      ElementKind::ClassRef { class } => {
        format!("Array.from({{ length: {} }}, () => new {}())", count, type_ident(class))
      }
      other => format!("new Array<{}>({}).fill({})", element_type(other), count, element_zero(other)),
    }),
    FieldKind::FixedList { .. } | FieldKind::DynamicList { .. } => Some("[]".to_string()),
    FieldKind::StaticValue { .. } | FieldKind::Pad { .. } => None,
    other => other.as_element().map(|e| element_zero(&e)),
  }
}

pub fn initializer_value(init: &Initializer, wrappers: &IndexMap<String, StorageWrapper<'_>>) -> String {
  match &init.format {
    LiteralFormat::Numeric(prim) if prim.is_float() => numeric_text(&init.value, init.integer, &init.format),
    LiteralFormat::Numeric(prim) => int_literal(init.integer.unwrap_or(0), *prim),
    LiteralFormat::EnumConstant { type_name, storage } => {
      if let Literal::EnumRef { variant, .. } = &init.value {
        if wrappers.get(type_name).is_some_and(|w| w.has_variant(variant)) {
          return format!("{}.{}", type_ident(type_name), const_ident(variant));
        }
      }
      int_literal(init.integer.unwrap_or(0), *storage)
    }
  }
}

/* JSDoc block */
pub fn jsdoc(comment: Option<&str>, indent: &str) -> String {
  let Some(text) = comment else {
    return String::new();
  };
  let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
  if lines.len() == 1 {
    return format!("{}/** {} */\n", indent, lines[0]);
  }
  let mut out = format!("{}/**\n", indent);
  for line in lines {
    if line.is_empty() {
      out.push_str(&format!("{} *\n", indent));
    } else {
      out.push_str(&format!("{} * {}\n", indent, line));
    }
  }
  out.push_str(&format!("{} */\n", indent));
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identifiers_follow_typescript_conventions() {
    assert_eq!(type_ident("entity_state_pdu"), "EntityStatePdu");
    assert_eq!(field_ident("entity_id"), "entityId");
    assert_eq!(field_ident("class"), "class_");
    assert_eq!(field_ident("marshal"), "marshal_");
    assert_eq!(method_stem("marking"), "Marking");
  }

  #[test]
  fn literals_wrap_to_storage() {
    assert_eq!(int_literal(-1, PrimitiveType::Uint8), "255");
    assert_eq!(int_literal(5, PrimitiveType::Uint64), "5n");
    assert_eq!(int_literal(-1, PrimitiveType::Int64), "-1n");
    assert_eq!(dataview_suffix(PrimitiveType::Uint64), "BigUint64");
  }
}
