//! Type & Size Catalog.
//!
//! Maps the abstract primitive codes used in schema documents to a fixed wire
//! width and to each backend's concrete type token. Widths are the wire
//! contract and never vary by backend.

use crate::codegen::Language;
use serde_derive::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveType {
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown primitive type '{0}'")]
pub struct UnknownPrimitive(pub String);

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 10] = [
        PrimitiveType::Uint8,
        PrimitiveType::Uint16,
        PrimitiveType::Uint32,
        PrimitiveType::Uint64,
        PrimitiveType::Int8,
        PrimitiveType::Int16,
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::Float32,
        PrimitiveType::Float64,
    ];

    /// Looks up a primitive by its schema name. Besides the canonical
    /// `uint8`..`float64` codes, the Java-style names found in older DIS
    /// schemas (`unsigned short`, `double`, ...) are accepted.
    pub fn from_name(name: &str) -> Result<Self, UnknownPrimitive> {
        let normalized = name.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        let prim = match normalized.as_str() {
            "uint8" | "unsigned byte" | "ubyte" => PrimitiveType::Uint8,
            "uint16" | "unsigned short" | "ushort" => PrimitiveType::Uint16,
            "uint32" | "unsigned int" | "uint" => PrimitiveType::Uint32,
            "uint64" | "unsigned long" | "ulong" => PrimitiveType::Uint64,
            "int8" | "byte" => PrimitiveType::Int8,
            "int16" | "short" => PrimitiveType::Int16,
            "int32" | "int" => PrimitiveType::Int32,
            "int64" | "long" => PrimitiveType::Int64,
            "float32" | "float" => PrimitiveType::Float32,
            "float64" | "double" => PrimitiveType::Float64,
            _ => return Err(UnknownPrimitive(name.to_string())),
        };
        Ok(prim)
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Uint8 => "uint8",
            PrimitiveType::Uint16 => "uint16",
            PrimitiveType::Uint32 => "uint32",
            PrimitiveType::Uint64 => "uint64",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Float32 => "float32",
            PrimitiveType::Float64 => "float64",
        }
    }

    /// Wire width in bytes.
    pub fn width(self) -> usize {
        match self {
            PrimitiveType::Uint8 | PrimitiveType::Int8 => 1,
            PrimitiveType::Uint16 | PrimitiveType::Int16 => 2,
            PrimitiveType::Uint32 | PrimitiveType::Int32 | PrimitiveType::Float32 => 4,
            PrimitiveType::Uint64 | PrimitiveType::Int64 | PrimitiveType::Float64 => 8,
        }
    }

    pub fn bits(self) -> u32 {
        (self.width() * 8) as u32
    }

    pub fn is_integer(self) -> bool {
        !self.is_float()
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveType::Float32 | PrimitiveType::Float64)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveType::Int8
                | PrimitiveType::Int16
                | PrimitiveType::Int32
                | PrimitiveType::Int64
                | PrimitiveType::Float32
                | PrimitiveType::Float64
        )
    }

    /// Largest element count this type can carry when used as a list counter.
    pub fn max_count(self) -> u64 {
        match self {
            PrimitiveType::Uint8 => u8::MAX as u64,
            PrimitiveType::Uint16 => u16::MAX as u64,
            PrimitiveType::Uint32 => u32::MAX as u64,
            PrimitiveType::Uint64 => u64::MAX,
            PrimitiveType::Int8 => i8::MAX as u64,
            PrimitiveType::Int16 => i16::MAX as u64,
            PrimitiveType::Int32 => i32::MAX as u64,
            PrimitiveType::Int64 => i64::MAX as u64,
            PrimitiveType::Float32 | PrimitiveType::Float64 => 0,
        }
    }

    /// Bit mask covering the full host width.
    pub fn full_mask(self) -> u64 {
        match self.bits() {
            64 => u64::MAX,
            bits => (1u64 << bits) - 1,
        }
    }

    /// Concrete type token for a backend.
    pub fn type_token(self, language: Language) -> &'static str {
        match language {
            Language::Rust => self.rust_type(),
            Language::C => self.c_type(),
            Language::TypeScript => self.ts_type(),
        }
    }

    pub fn rust_type(self) -> &'static str {
        match self {
            PrimitiveType::Uint8 => "u8",
            PrimitiveType::Uint16 => "u16",
            PrimitiveType::Uint32 => "u32",
            PrimitiveType::Uint64 => "u64",
            PrimitiveType::Int8 => "i8",
            PrimitiveType::Int16 => "i16",
            PrimitiveType::Int32 => "i32",
            PrimitiveType::Int64 => "i64",
            PrimitiveType::Float32 => "f32",
            PrimitiveType::Float64 => "f64",
        }
    }

    pub fn c_type(self) -> &'static str {
        match self {
            PrimitiveType::Uint8 => "uint8_t",
            PrimitiveType::Uint16 => "uint16_t",
            PrimitiveType::Uint32 => "uint32_t",
            PrimitiveType::Uint64 => "uint64_t",
            PrimitiveType::Int8 => "int8_t",
            PrimitiveType::Int16 => "int16_t",
            PrimitiveType::Int32 => "int32_t",
            PrimitiveType::Int64 => "int64_t",
            PrimitiveType::Float32 => "float",
            PrimitiveType::Float64 => "double",
        }
    }

    /// 64-bit integers are `bigint` so no precision is lost.
    pub fn ts_type(self) -> &'static str {
        match self {
            PrimitiveType::Uint64 | PrimitiveType::Int64 => "bigint",
            _ => "number",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_are_fixed() {
        let widths: Vec<usize> = PrimitiveType::ALL.iter().map(|p| p.width()).collect();
        assert_eq!(widths, vec![1, 2, 4, 8, 1, 2, 4, 8, 4, 8]);
    }

    #[test]
    fn legacy_names_map_to_canonical_types() {
        assert_eq!(PrimitiveType::from_name("unsigned short"), Ok(PrimitiveType::Uint16));
        assert_eq!(PrimitiveType::from_name("double"), Ok(PrimitiveType::Float64));
        assert_eq!(PrimitiveType::from_name("UINT32"), Ok(PrimitiveType::Uint32));
        assert_eq!(PrimitiveType::from_name("unsigned_byte"), Ok(PrimitiveType::Uint8));
    }

    #[test]
    fn unknown_names_are_errors() {
        assert_eq!(
            PrimitiveType::from_name("uint24"),
            Err(UnknownPrimitive("uint24".to_string()))
        );
    }

    #[test]
    fn every_backend_has_a_token() {
        for prim in PrimitiveType::ALL {
            for lang in [Language::Rust, Language::C, Language::TypeScript] {
                assert!(!prim.type_token(lang).is_empty());
            }
        }
        assert_eq!(PrimitiveType::Int64.type_token(Language::TypeScript), "bigint");
        assert_eq!(PrimitiveType::Uint8.full_mask(), 0xff);
        assert_eq!(PrimitiveType::Uint64.full_mask(), u64::MAX);
    }
}
