//! Per-class generation instructions shared by every backend.
//!
//! A [`ClassPlan`] is the ordered instruction sequence for one class: what to
//! write, read, measure, compare, hash and render, with every cross-reference
//! already resolved. Backends only translate steps into syntax; they never
//! re-derive wire layout from the schema. Plans serialize to JSON or YAML for
//! `pdu-gen analyze --print-plan` and for out-of-process renderers.
//!
//! # Example
//! ```
//! use pdu_gen::codegen::shared::plan::*;
//! use pdu_gen::schema::{ElementKind, PrimitiveType};
//!
//! let step = MarshalStep::Value {
//!     field: "count".into(),
//!     element: ElementKind::Primitive { prim: PrimitiveType::Uint16 },
//! };
//! let json = serde_json::to_string(&step).unwrap();
//! assert!(json.starts_with(r#"{"op":"value""#));
//! ```

use crate::schema::{ElementKind, FieldKind, PrimitiveType, ResolvedInitialValue};
use pdu_types::Literal;
use serde_derive::Serialize;

/// Version of the serialized plan layout.
pub const PLAN_SCHEMA_VERSION: u32 = 1;

/// Defaults and initial values in the order they are applied.
pub type Initializer = ResolvedInitialValue;

/// Plan for a single class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassPlan {
    pub class_name: String,
    pub parent: Option<String>,
    /// Set for alias classes, whose step lists are empty.
    pub alias_for: Option<String>,
    pub is_abstract: bool,
    pub comment: Option<String>,
    pub fields: Vec<FieldPlan>,
    pub marshal: Vec<MarshalStep>,
    pub unmarshal: Vec<UnmarshalStep>,
    pub size: Vec<SizeTerm>,
    /// Shared by structural equality and hashing.
    pub comparison: Vec<CompareStep>,
    pub dump: Vec<DumpStep>,
    pub bitfields: Vec<BitfieldAccessor>,
    pub initializers: Vec<Initializer>,
    pub constants: Vec<StaticConstant>,
}

impl ClassPlan {
    pub fn is_alias(&self) -> bool {
        self.alias_for.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&FieldPlan> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that occupy storage in an instance.
    pub fn stored_fields(&self) -> impl Iterator<Item = &FieldPlan> {
        self.fields
            .iter()
            .filter(|f| !matches!(f.kind, FieldKind::StaticValue { .. } | FieldKind::Pad { .. }))
    }
}

/// Declaration-level view of one own attribute.
#[derive(Debug, Clone, Serialize)]
pub struct FieldPlan {
    pub name: String,
    pub comment: Option<String>,
    pub kind: FieldKind,
    pub serialize: bool,
    /// The list whose live length this field carries on the wire.
    pub counter_for: Option<String>,
    /// Byte array that also has string accessors.
    pub text_capable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum MarshalStep {
    /// Write the parent-class view first.
    Parent { class: String },
    Value { field: String, element: ElementKind },
    /// Write the live length of `list` instead of the stored value.
    LiveCount {
        field: String,
        prim: PrimitiveType,
        list: String,
    },
    FixedElements {
        field: String,
        element: ElementKind,
        count: u64,
    },
    LiveElements { field: String, element: ElementKind },
    Pad { bytes: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum UnmarshalStep {
    Parent { class: String },
    Value { field: String, element: ElementKind },
    FixedElements {
        field: String,
        element: ElementKind,
        count: u64,
    },
    /// Clear the list, then read as many elements as the already decoded
    /// `counter` holds. Without a counter the list decodes as empty.
    CountedElements {
        field: String,
        element: ElementKind,
        counter: Option<String>,
    },
    SkipPad { bytes: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum SizeTerm {
    Parent { class: String },
    Fixed { field: String, bytes: usize },
    Nested { field: String, class: String },
    /// Sum of each element's own size.
    NestedElements { field: String, class: String },
    /// `live length * element_width`
    LiveElements { field: String, element_width: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum CompareStep {
    Parent { class: String },
    Value { field: String, element: ElementKind },
    Elements { field: String, element: ElementKind },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum DumpStep {
    Parent { class: String },
    Value { field: String, element: ElementKind },
    Elements { field: String, element: ElementKind },
    Text { field: String },
}

/// Getter/setter for one masked sub-range of a host primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitfieldAccessor {
    pub host: String,
    pub host_prim: PrimitiveType,
    pub name: String,
    pub mask: u64,
    pub shift: u32,
    pub width_bits: u32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticConstant {
    pub name: String,
    pub prim: PrimitiveType,
    pub value: Literal,
    pub comment: Option<String>,
}

/// Serialized form of a whole generation run.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSet<'a> {
    pub version: u32,
    pub order: &'a [String],
    pub classes: Vec<&'a ClassPlan>,
}

impl<'a> PlanSet<'a> {
    pub fn new(order: &'a [String], classes: Vec<&'a ClassPlan>) -> Self {
        Self {
            version: PLAN_SCHEMA_VERSION,
            order,
            classes,
        }
    }
}
