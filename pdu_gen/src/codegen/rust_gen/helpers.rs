/* Helper utilities for Rust code generation */

use crate::codegen::shared::initial::numeric_text;
use crate::codegen::shared::{Initializer, StorageWrapper};
use crate::schema::{ElementKind, FieldKind, ListLength, LiteralFormat, PrimitiveType};
use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use indexmap::IndexMap;
use pdu_types::Literal;

/* Escape Rust keywords to valid identifiers */
pub fn escape_rust_keyword(name: &str) -> String {
  const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "static", "struct",
    "trait", "true", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
  ];
  /* Not usable as raw identifiers */
  const RESERVED_PATHS: &[&str] = &["self", "Self", "crate", "super"];

  if RESERVED_PATHS.contains(&name) {
    format!("{}_", name)
  } else if RUST_KEYWORDS.contains(&name) {
    format!("r#{}", name)
  } else {
    name.to_string()
  }
}

fn leading_digit_guard(name: String, prefix: &str) -> String {
  match name.chars().next() {
    Some(c) if c.is_ascii_digit() => format!("{}{}", prefix, name),
    None => prefix.to_string(),
    _ => name,
  }
}

/* Struct and wrapper type names */
pub fn type_ident(name: &str) -> String {
  escape_rust_keyword(&leading_digit_guard(name.to_upper_camel_case(), "T"))
}

/* Field and method names */
pub fn field_ident(name: &str) -> String {
  escape_rust_keyword(&leading_digit_guard(name.to_snake_case(), "f_"))
}

/* Identifier fragment used inside other names (`set_<x>`, `<x>_text`) */
pub fn field_stem(name: &str) -> String {
  leading_digit_guard(name.to_snake_case(), "f_")
}

pub fn const_ident(name: &str) -> String {
  leading_digit_guard(name.to_shouty_snake_case(), "_")
}

pub fn module_ident(package: &str) -> String {
  field_stem(package.rsplit('.').next().unwrap_or(package))
}

/* Unsigned type with the same width, used for bit manipulation */
pub fn unsigned_twin(prim: PrimitiveType) -> &'static str {
  match prim.width() {
    1 => "u8",
    2 => "u16",
    4 => "u32",
    _ => "u64",
  }
}

/* Integer literal that is valid for `prim`, wrapping out-of-range values */
pub fn int_literal(value: i128, prim: PrimitiveType) -> String {
  let fits = match prim {
    PrimitiveType::Uint8 => u8::try_from(value).is_ok(),
    PrimitiveType::Uint16 => u16::try_from(value).is_ok(),
    PrimitiveType::Uint32 => u32::try_from(value).is_ok(),
    PrimitiveType::Uint64 => u64::try_from(value).is_ok(),
    PrimitiveType::Int8 => i8::try_from(value).is_ok(),
    PrimitiveType::Int16 => i16::try_from(value).is_ok(),
    PrimitiveType::Int32 => i32::try_from(value).is_ok(),
    PrimitiveType::Int64 => i64::try_from(value).is_ok(),
    PrimitiveType::Float32 | PrimitiveType::Float64 => true,
  };
  if fits {
    value.to_string()
  } else {
    format!("({}i128 as {})", value, prim.rust_type())
  }
}

pub fn zero_literal(prim: PrimitiveType) -> &'static str {
  if prim.is_float() { "0.0" } else { "0" }
}

pub fn element_type(element: &ElementKind) -> String {
  match element {
    ElementKind::Primitive { prim } => prim.rust_type().to_string(),
    ElementKind::ClassRef { class } => type_ident(class),
    ElementKind::Enum(storage) | ElementKind::Bitfield(storage) => type_ident(storage.type_name()),
  }
}

pub fn element_zero(element: &ElementKind) -> String {
  match element {
    ElementKind::Primitive { prim } => zero_literal(*prim).to_string(),
    ElementKind::ClassRef { class } => format!("{}::new()", type_ident(class)),
    ElementKind::Enum(storage) | ElementKind::Bitfield(storage) => {
      format!("{}(0)", type_ident(storage.type_name()))
    }
  }
}

/* Declared type of a stored field; None for padding and static values */
pub fn field_type(kind: &FieldKind) -> Option<String> {
  match kind {
    FieldKind::Primitive { prim } => Some(prim.rust_type().to_string()),
    FieldKind::ClassRef { class } => Some(type_ident(class)),
    FieldKind::Enum(storage) | FieldKind::Bitfield(storage) => Some(type_ident(storage.type_name())),
    FieldKind::FixedList { element, length: ListLength::Literal(count), .. } => {
      Some(format!("[{}; {}]", element_type(element), count))
    }
    FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => {
      Some(format!("Vec<{}>", element_type(element)))
    }
    FieldKind::StaticValue { .. } | FieldKind::Pad { .. } => None,
  }
}

pub fn field_zero(kind: &FieldKind) -> Option<String> {
  match kind {
    FieldKind::Primitive { prim } => Some(zero_literal(*prim).to_string()),
    FieldKind::ClassRef { .. } | FieldKind::Enum(_) | FieldKind::Bitfield(_) => {
      kind.as_element().map(|e| element_zero(&e))
    }
    FieldKind::FixedList { element, length: ListLength::Literal(count), .. } => Some(match element {
      ElementKind::ClassRef { class } => {
        format!("std::array::from_fn(|_| {}::new())", type_ident(class))
      }
      other => format!("[{}; {}]", element_zero(other), count),
    }),
    FieldKind::FixedList { .. } | FieldKind::DynamicList { .. } => Some("Vec::new()".to_string()),
    FieldKind::StaticValue { .. } | FieldKind::Pad { .. } => None,
  }
}

/* Right-hand side for a constructor initializer */
pub fn initializer_value(init: &Initializer, wrappers: &IndexMap<String, StorageWrapper<'_>>) -> String {
  match &init.format {
    LiteralFormat::Numeric(prim) => match (prim.is_float(), init.integer) {
      (false, Some(value)) => int_literal(value, *prim),
      _ => numeric_text(&init.value, init.integer, &init.format),
    },
    LiteralFormat::EnumConstant { type_name, storage } => {
      let ident = type_ident(type_name);
      if let Literal::EnumRef { variant, .. } = &init.value {
        if wrappers.get(type_name).is_some_and(|w| w.has_variant(variant)) {
          return format!("{}::{}", ident, const_ident(variant));
        }
      }
      format!("{}({})", ident, int_literal(init.integer.unwrap_or(0), *storage))
    }
  }
}

/* Line comment block for doc text */
pub fn doc_comment(comment: Option<&str>, indent: &str) -> String {
  let mut out = String::new();
  if let Some(text) = comment {
    for line in text.lines() {
      let line = line.trim_end();
      if line.is_empty() {
        out.push_str(&format!("{}///\n", indent));
      } else {
        out.push_str(&format!("{}/// {}\n", indent, line));
      }
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identifiers_follow_rust_conventions() {
    assert_eq!(type_ident("entity_state_pdu"), "EntityStatePdu");
    assert_eq!(field_ident("entityID"), "entity_id");
    assert_eq!(field_ident("type"), "r#type");
    assert_eq!(field_ident("self"), "self_");
    assert_eq!(const_ident("EntityState"), "ENTITY_STATE");
    assert_eq!(const_ident("4_WHEELS"), "_4_WHEELS");
    assert_eq!(module_ident("dis.v7"), "v7");
  }

  #[test]
  fn out_of_range_literals_wrap() {
    assert_eq!(int_literal(255, PrimitiveType::Uint8), "255");
    assert_eq!(int_literal(-1, PrimitiveType::Uint8), "(-1i128 as u8)");
    assert_eq!(int_literal(-1, PrimitiveType::Int8), "-1");
  }
}
