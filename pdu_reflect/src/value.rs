use indexmap::IndexMap;
use pdu_gen::schema::PrimitiveType;
use serde::Serialize;
use std::fmt;

/* One primitive value, tagged with its wire type */
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Scalar {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    pub fn zero(prim: PrimitiveType) -> Self {
        Self::from_integer(prim, 0)
    }

    pub fn prim(&self) -> PrimitiveType {
        match self {
            Scalar::U8(_) => PrimitiveType::Uint8,
            Scalar::U16(_) => PrimitiveType::Uint16,
            Scalar::U32(_) => PrimitiveType::Uint32,
            Scalar::U64(_) => PrimitiveType::Uint64,
            Scalar::I8(_) => PrimitiveType::Int8,
            Scalar::I16(_) => PrimitiveType::Int16,
            Scalar::I32(_) => PrimitiveType::Int32,
            Scalar::I64(_) => PrimitiveType::Int64,
            Scalar::F32(_) => PrimitiveType::Float32,
            Scalar::F64(_) => PrimitiveType::Float64,
        }
    }

    /// Stores `value` as `prim`, wrapping the way a two's complement cast does.
    pub fn from_integer(prim: PrimitiveType, value: i128) -> Self {
        match prim {
            PrimitiveType::Uint8 => Scalar::U8(value as u8),
            PrimitiveType::Uint16 => Scalar::U16(value as u16),
            PrimitiveType::Uint32 => Scalar::U32(value as u32),
            PrimitiveType::Uint64 => Scalar::U64(value as u64),
            PrimitiveType::Int8 => Scalar::I8(value as i8),
            PrimitiveType::Int16 => Scalar::I16(value as i16),
            PrimitiveType::Int32 => Scalar::I32(value as i32),
            PrimitiveType::Int64 => Scalar::I64(value as i64),
            PrimitiveType::Float32 => Scalar::F32(value as f32),
            PrimitiveType::Float64 => Scalar::F64(value as f64),
        }
    }

    pub fn from_float(prim: PrimitiveType, value: f64) -> Self {
        match prim {
            PrimitiveType::Float32 => Scalar::F32(value as f32),
            PrimitiveType::Float64 => Scalar::F64(value),
            integer => Self::from_integer(integer, value as i128),
        }
    }

    /// Rebuilds a value from its zero-extended bit pattern.
    pub fn from_bits(prim: PrimitiveType, bits: u64) -> Self {
        match prim {
            PrimitiveType::Uint8 => Scalar::U8(bits as u8),
            PrimitiveType::Uint16 => Scalar::U16(bits as u16),
            PrimitiveType::Uint32 => Scalar::U32(bits as u32),
            PrimitiveType::Uint64 => Scalar::U64(bits),
            PrimitiveType::Int8 => Scalar::I8(bits as u8 as i8),
            PrimitiveType::Int16 => Scalar::I16(bits as u16 as i16),
            PrimitiveType::Int32 => Scalar::I32(bits as u32 as i32),
            PrimitiveType::Int64 => Scalar::I64(bits as i64),
            PrimitiveType::Float32 => Scalar::F32(f32::from_bits(bits as u32)),
            PrimitiveType::Float64 => Scalar::F64(f64::from_bits(bits)),
        }
    }

    /// Bit pattern of the value, zero-extended to 64 bits.
    pub fn to_bits(&self) -> u64 {
        match *self {
            Scalar::U8(v) => v as u64,
            Scalar::U16(v) => v as u64,
            Scalar::U32(v) => v as u64,
            Scalar::U64(v) => v,
            Scalar::I8(v) => v as u8 as u64,
            Scalar::I16(v) => v as u16 as u64,
            Scalar::I32(v) => v as u32 as u64,
            Scalar::I64(v) => v as u64,
            Scalar::F32(v) => v.to_bits() as u64,
            Scalar::F64(v) => v.to_bits(),
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Scalar::U8(v) => Some(v as i128),
            Scalar::U16(v) => Some(v as i128),
            Scalar::U32(v) => Some(v as i128),
            Scalar::U64(v) => Some(v as i128),
            Scalar::I8(v) => Some(v as i128),
            Scalar::I16(v) => Some(v as i128),
            Scalar::I32(v) => Some(v as i128),
            Scalar::I64(v) => Some(v as i128),
            Scalar::F32(_) | Scalar::F64(_) => None,
        }
    }

    /// Number of elements a counter holding this value announces. Negative
    /// counters announce none.
    pub fn as_count(&self) -> u64 {
        self.as_i128().map_or(0, |v| v.clamp(0, u64::MAX as i128) as u64)
    }

    /// Counter value for `count` live elements, if `prim` can hold it.
    pub fn count(prim: PrimitiveType, count: usize) -> Option<Self> {
        let count = u64::try_from(count).ok()?;
        if prim.is_float() || count > prim.max_count() {
            return None;
        }
        Some(Self::from_integer(prim, count as i128))
    }

    /// Structural equality: same wire type and same bit pattern. Floats
    /// compare by bits, so a NaN equals itself and `-0.0` differs from `0.0`,
    /// matching [`Scalar::hash_term`].
    pub fn same_bits(&self, other: &Scalar) -> bool {
        self.prim() == other.prim() && self.to_bits() == other.to_bits()
    }

    /// Contribution of this value to a structural hash: integers widen with
    /// sign extension, floats hash by bit pattern.
    pub fn hash_term(&self) -> u64 {
        match *self {
            Scalar::F32(v) => v.to_bits() as u64,
            Scalar::F64(v) => v.to_bits(),
            Scalar::I8(v) => v as u64,
            Scalar::I16(v) => v as u64,
            Scalar::I32(v) => v as u64,
            Scalar::I64(v) => v as u64,
            other => other.to_bits(),
        }
    }

    /* `{:?}` of the bare number, as list dumps print it */
    pub fn debug_text(&self) -> String {
        match self {
            Scalar::U8(v) => format!("{:?}", v),
            Scalar::U16(v) => format!("{:?}", v),
            Scalar::U32(v) => format!("{:?}", v),
            Scalar::U64(v) => format!("{:?}", v),
            Scalar::I8(v) => format!("{:?}", v),
            Scalar::I16(v) => format!("{:?}", v),
            Scalar::I32(v) => format!("{:?}", v),
            Scalar::I64(v) => format!("{:?}", v),
            Scalar::F32(v) => format!("{:?}", v),
            Scalar::F64(v) => format!("{:?}", v),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::U8(v) => write!(f, "{}", v),
            Scalar::U16(v) => write!(f, "{}", v),
            Scalar::U32(v) => write!(f, "{}", v),
            Scalar::U64(v) => write!(f, "{}", v),
            Scalar::I8(v) => write!(f, "{}", v),
            Scalar::I16(v) => write!(f, "{}", v),
            Scalar::I32(v) => write!(f, "{}", v),
            Scalar::I64(v) => write!(f, "{}", v),
            Scalar::F32(v) => write!(f, "{}", v),
            Scalar::F64(v) => write!(f, "{}", v),
        }
    }
}

/* Dynamic value of one field */
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Value {
    Scalar(Scalar),
    /// Enumeration stored as its raw wire value; unnamed values are kept.
    Enum { type_name: String, raw: Scalar },
    /// Bit-packed host value.
    Bits { type_name: String, raw: Scalar },
    Record(Record),
    List(Vec<Value>),
}

impl Value {
    pub fn describe(&self) -> String {
        match self {
            Value::Scalar(s) => s.prim().name().to_string(),
            Value::Enum { type_name, .. } => format!("enum {}", type_name),
            Value::Bits { type_name, .. } => format!("bitfield {}", type_name),
            Value::Record(r) => format!("record {}", r.class),
            Value::List(items) => format!("list of {}", items.len()),
        }
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Stored number of scalar, enum and bitfield values.
    pub fn raw(&self) -> Option<Scalar> {
        match self {
            Value::Scalar(raw) | Value::Enum { raw, .. } | Value::Bits { raw, .. } => Some(*raw),
            Value::Record(_) | Value::List(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Builds a list of scalars, e.g. `Value::list([1u8, 2, 3])`.
    pub fn list<T: Into<Scalar>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(|item| Value::Scalar(item.into())).collect())
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(value))
                }
            }
        )*
    };
}

scalar_from! {
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    f32 => F32, f64 => F64,
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

/// Instance of one class: its own stored fields in declaration order, with
/// the parent-class view nested underneath.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Record>>,
    pub fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            parent: None,
            fields: IndexMap::new(),
        }
    }

    pub fn parent(&self) -> Option<&Record> {
        self.parent.as_deref()
    }

    /// Looks `field` up in this record, then along the parent chain.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field) {
            Some(value) => Some(value),
            None => self.parent.as_deref()?.get(field),
        }
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        if self.fields.contains_key(field) {
            return self.fields.get_mut(field);
        }
        self.parent.as_deref_mut()?.get_mut(field)
    }

    /// Replaces an existing field anywhere in the chain. Returns false when
    /// no level declares `field`.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> bool {
        match self.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// The view of this record as `class`, itself or an ancestor.
    pub fn view(&self, class: &str) -> Option<&Record> {
        if self.class == class {
            return Some(self);
        }
        self.parent.as_deref()?.view(class)
    }

    pub fn view_mut(&mut self, class: &str) -> Option<&mut Record> {
        if self.class == class {
            return Some(self);
        }
        self.parent.as_deref_mut()?.view_mut(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_wrap_into_storage() {
        assert_eq!(Scalar::from_integer(PrimitiveType::Uint8, -1), Scalar::U8(255));
        assert_eq!(Scalar::from_integer(PrimitiveType::Int8, 200), Scalar::I8(-56));
        assert_eq!(Scalar::from_float(PrimitiveType::Int16, 3.9), Scalar::I16(3));
    }

    #[test]
    fn bit_patterns_are_zero_extended() {
        assert_eq!(Scalar::I8(-1).to_bits(), 0xFF);
        assert_eq!(Scalar::from_bits(PrimitiveType::Int16, 0xFFFE), Scalar::I16(-2));
        assert_eq!(Scalar::I8(-1).hash_term(), u64::MAX);
    }

    #[test]
    fn floats_compare_by_bit_pattern() {
        assert!(!Scalar::F64(0.0).same_bits(&Scalar::F64(-0.0)));
        assert!(Scalar::F32(f32::NAN).same_bits(&Scalar::F32(f32::NAN)));
        assert!(!Scalar::U8(1).same_bits(&Scalar::I8(1)));
    }

    #[test]
    fn counters_are_range_checked() {
        assert_eq!(Scalar::count(PrimitiveType::Uint8, 255), Some(Scalar::U8(255)));
        assert_eq!(Scalar::count(PrimitiveType::Uint8, 256), None);
        assert_eq!(Scalar::count(PrimitiveType::Int8, 128), None);
        assert_eq!(Scalar::count(PrimitiveType::Float32, 1), None);
        assert_eq!(Scalar::I16(-4).as_count(), 0);
    }

    #[test]
    fn lookups_walk_the_parent_chain() {
        let mut header = Record::new("Header");
        header.fields.insert("version".into(), Value::from(7u8));
        let mut pdu = Record::new("Fire");
        pdu.fields.insert("range".into(), Value::from(1.5f32));
        pdu.parent = Some(Box::new(header));

        assert_eq!(pdu.get("version"), Some(&Value::from(7u8)));
        assert!(pdu.set("version", 6u8));
        assert!(!pdu.set("missing", 1u8));
        assert_eq!(pdu.view("Header").and_then(|h| h.get("version")), Some(&Value::from(6u8)));
    }
}
