/* Helper utilities for C code generation */

use crate::codegen::shared::initial::numeric_text;
use crate::codegen::shared::{Initializer, StorageWrapper};
use crate::schema::{ElementKind, LiteralFormat, PrimitiveType};
use indexmap::IndexMap;
use pdu_types::Literal;

const C_KEYWORDS: &[&str] = &[
  "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else", "enum",
  "extern", "float", "for", "goto", "if", "inline", "int", "long", "register", "restrict",
  "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union",
  "unsigned", "void", "volatile", "while", "bool", "true", "false",
];

/* Replace anything that is not valid in a C identifier */
pub fn sanitize(name: &str) -> String {
  let mut out: String = name
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect();
  if out.chars().next().is_none_or(|c| c.is_ascii_digit()) {
    out.insert(0, '_');
  }
  out
}

pub fn field_ident(name: &str) -> String {
  let ident = sanitize(name);
  if C_KEYWORDS.contains(&ident.as_str()) {
    format!("{}_", ident)
  } else {
    ident
  }
}

/* `Foo` -> `Foo_t` */
pub fn type_name(name: &str) -> String {
  format!("{}_t", sanitize(name))
}

/* Prefix for the functions of a class: `Foo_marshal`, `Foo_hash`, ... */
pub fn fn_prefix(name: &str) -> String {
  sanitize(name)
}

pub fn guard_macro(package: &str) -> String {
  format!("PDU_{}_H", sanitize(package).to_ascii_uppercase())
}

/* Suffix of the runtime helpers: `pdu_put_u16`, `pdu_get_f64`, ... */
pub fn wire_suffix(prim: PrimitiveType) -> &'static str {
  prim.rust_type()
}

pub fn unsigned_c_type(prim: PrimitiveType) -> &'static str {
  match prim.width() {
    1 => "uint8_t",
    2 => "uint16_t",
    4 => "uint32_t",
    _ => "uint64_t",
  }
}

pub fn max_macro(prim: PrimitiveType) -> Option<&'static str> {
  match prim {
    PrimitiveType::Uint8 => Some("UINT8_MAX"),
    PrimitiveType::Uint16 => Some("UINT16_MAX"),
    PrimitiveType::Uint32 => Some("UINT32_MAX"),
    PrimitiveType::Int8 => Some("INT8_MAX"),
    PrimitiveType::Int16 => Some("INT16_MAX"),
    PrimitiveType::Int32 => Some("INT32_MAX"),
    PrimitiveType::Int64 => Some("INT64_MAX"),
    PrimitiveType::Uint64 | PrimitiveType::Float32 | PrimitiveType::Float64 => None,
  }
}

pub fn element_c_type(element: &ElementKind) -> String {
  match element {
    ElementKind::Primitive { prim } => prim.c_type().to_string(),
    ElementKind::ClassRef { class } => type_name(class),
    ElementKind::Enum(storage) | ElementKind::Bitfield(storage) => type_name(storage.type_name()),
  }
}

pub fn int_literal(value: i128, prim: PrimitiveType) -> String {
  let ty = prim.c_type();
  if value < 0 {
    format!("(({})({}LL))", ty, value)
  } else if prim.width() == 8 {
    format!("(({})UINT64_C({}))", ty, value)
  } else {
    format!("(({}){}u)", ty, value)
  }
}

/* Bit manipulation happens in 64-bit unsigned arithmetic */
pub fn mask_literal(mask: u64) -> String {
  format!("UINT64_C({:#x})", mask)
}

pub fn initializer_value(init: &Initializer, wrappers: &IndexMap<String, StorageWrapper<'_>>) -> String {
  match &init.format {
    LiteralFormat::Numeric(prim) if prim.is_float() => numeric_text(&init.value, init.integer, &init.format),
    LiteralFormat::Numeric(prim) => int_literal(init.integer.unwrap_or(0), *prim),
    LiteralFormat::EnumConstant { type_name: name, storage } => {
      if let Literal::EnumRef { variant, .. } = &init.value {
        if wrappers.get(name).is_some_and(|w| w.has_variant(variant)) {
          return constant_name(name, variant);
        }
      }
      int_literal(init.integer.unwrap_or(0), *storage)
    }
  }
}

/* `DisPduType_ENTITY_STATE` */
pub fn constant_name(type_name: &str, variant: &str) -> String {
  format!("{}_{}", sanitize(type_name), sanitize(variant))
}

/* printf conversion for a primitive, with the cast that matches it */
pub fn printf_format(prim: PrimitiveType) -> (&'static str, &'static str) {
  if prim.is_float() {
    ("%g", "(double)")
  } else if prim.is_signed() {
    ("%\" PRId64 \"", "(int64_t)")
  } else {
    ("%\" PRIu64 \"", "(uint64_t)")
  }
}

pub fn c_comment(comment: Option<&str>, indent: &str) -> String {
  match comment {
    Some(text) => {
      let body = text.lines().map(str::trim).collect::<Vec<_>>().join(" ");
      format!("{}/* {} */\n", indent, body.replace("*/", "* /"))
    }
    None => String::new(),
  }
}
