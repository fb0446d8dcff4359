/* Wire runtime emitted at the top of every generated Rust module */

use crate::config::GeneratorConfig;
use std::fmt::{self, Write};

pub fn emit_runtime(out: &mut String, config: &GeneratorConfig) -> fmt::Result {
  let order = if config.is_big_endian() { "be" } else { "le" };

  out.push_str(RUNTIME_TYPES);
  writeln!(out)?;
  writeln!(out, "macro_rules! wire_primitive {{")?;
  writeln!(out, "  ($put:ident, $get:ident, $ty:ty) => {{")?;
  writeln!(out, "    impl WireWriter {{")?;
  writeln!(out, "      pub fn $put(&mut self, value: $ty) {{")?;
  writeln!(out, "        self.buf.extend_from_slice(&value.to_{}_bytes());", order)?;
  writeln!(out, "      }}")?;
  writeln!(out, "    }}")?;
  writeln!(out)?;
  writeln!(out, "    impl WireReader<'_> {{")?;
  writeln!(out, "      pub fn $get(&mut self) -> Result<$ty, WireError> {{")?;
  writeln!(out, "        let mut raw = [0u8; std::mem::size_of::<$ty>()];")?;
  writeln!(out, "        raw.copy_from_slice(self.take(std::mem::size_of::<$ty>())?);")?;
  writeln!(out, "        Ok(<$ty>::from_{}_bytes(raw))", order)?;
  writeln!(out, "      }}")?;
  writeln!(out, "    }}")?;
  writeln!(out, "  }};")?;
  writeln!(out, "}}")?;
  writeln!(out)?;
  for (put, get, ty) in PRIMITIVES {
    writeln!(out, "wire_primitive!({}, {}, {});", put, get, ty)?;
  }
  writeln!(out)?;
  Ok(())
}

const PRIMITIVES: &[(&str, &str, &str)] = &[
  ("put_u8", "get_u8", "u8"),
  ("put_u16", "get_u16", "u16"),
  ("put_u32", "get_u32", "u32"),
  ("put_u64", "get_u64", "u64"),
  ("put_i8", "get_i8", "i8"),
  ("put_i16", "get_i16", "i16"),
  ("put_i32", "get_i32", "i32"),
  ("put_i64", "get_i64", "i64"),
  ("put_f32", "get_f32", "f32"),
  ("put_f64", "get_f64", "f64"),
];

const RUNTIME_TYPES: &str = r#"use std::fmt::{self, Write as _};

/// Failure while encoding or decoding a PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
  /// The input ended before the value was complete.
  Truncated { needed: usize, remaining: usize },
  /// A list is longer than its counter field can express.
  CountOverflow { field: &'static str, count: usize },
}

impl fmt::Display for WireError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WireError::Truncated { needed, remaining } => {
        write!(f, "truncated input: needed {} bytes, {} remaining", needed, remaining)
      }
      WireError::CountOverflow { field, count } => {
        write!(f, "counter '{}' cannot hold {} elements", field, count)
      }
    }
  }
}

impl std::error::Error for WireError {}

#[derive(Debug, Clone, Default)]
pub struct WireWriter {
  buf: Vec<u8>,
}

impl WireWriter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self { buf: Vec::with_capacity(capacity) }
  }

  pub fn put_zeros(&mut self, count: usize) {
    self.buf.resize(self.buf.len() + count, 0);
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.buf
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.buf
  }
}

#[derive(Debug, Clone)]
pub struct WireReader<'a> {
  buf: &'a [u8],
  pos: usize,
}

impl<'a> WireReader<'a> {
  pub fn new(buf: &'a [u8]) -> Self {
    Self { buf, pos: 0 }
  }

  pub fn position(&self) -> usize {
    self.pos
  }

  pub fn remaining(&self) -> usize {
    self.buf.len() - self.pos
  }

  pub fn skip(&mut self, count: usize) -> Result<(), WireError> {
    self.take(count).map(|_| ())
  }

  fn take(&mut self, count: usize) -> Result<&'a [u8], WireError> {
    if self.remaining() < count {
      return Err(WireError::Truncated { needed: count, remaining: self.remaining() });
    }
    let bytes = &self.buf[self.pos..self.pos + count];
    self.pos += count;
    Ok(bytes)
  }
}

/// Order-sensitive hash step shared by every generated `wire_hash`.
pub fn hash_combine(acc: u64, value: u64) -> u64 {
  acc.wrapping_mul(31) ^ value
}
"#;
