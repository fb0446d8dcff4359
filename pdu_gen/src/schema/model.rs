//! Checked, name-indexed Schema Model.
//!
//! Built once from the ingested [`SchemaFile`]. Every structural malformation
//! is rejected here with a [`SchemaError`] naming the offending class and
//! attribute; recoverable cross-references are left for the resolver.

use crate::error::SchemaError;
use crate::schema::catalog::PrimitiveType;
use indexmap::IndexMap;
use pdu_types::{
    AttributeDef, AttributeKind, ClassDef, ElementDef, EnumDef, Literal, LiteralDef, SchemaFile,
    StorageTypeRef,
};
use serde_derive::Serialize;
use std::collections::{HashMap, HashSet};

/// Position of an attribute within its class's attribute sequence.
pub type AttrIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PadWidth {
    Pad16,
    Pad32,
    Pad64,
}

impl PadWidth {
    pub fn bytes(self) -> usize {
        match self {
            PadWidth::Pad16 => 2,
            PadWidth::Pad32 => 4,
            PadWidth::Pad64 => 8,
        }
    }
}

/// Enum or packed-bitfield type reference. `resolved` starts equal to
/// `declared` and is replaced by the UID alias when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageType {
    pub declared: String,
    pub resolved: String,
    pub storage: PrimitiveType,
    pub uid: Option<String>,
}

impl StorageType {
    pub fn type_name(&self) -> &str {
        &self.resolved
    }
}

/// Shape of a single value: a list element or a scalar-like attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ElementKind {
    Primitive { prim: PrimitiveType },
    ClassRef { class: String },
    Enum(StorageType),
    Bitfield(StorageType),
}

impl ElementKind {
    /// Wire width when it does not depend on the instance.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ElementKind::Primitive { prim } => Some(prim.width()),
            ElementKind::Enum(storage) | ElementKind::Bitfield(storage) => Some(storage.storage.width()),
            ElementKind::ClassRef { .. } => None,
        }
    }

    /// Primitive used to store the value in memory, if any.
    pub fn storage_primitive(&self) -> Option<PrimitiveType> {
        match self {
            ElementKind::Primitive { prim } => Some(*prim),
            ElementKind::Enum(storage) | ElementKind::Bitfield(storage) => Some(storage.storage),
            ElementKind::ClassRef { .. } => None,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            ElementKind::ClassRef { class } => Some(class),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListLength {
    Literal(u64),
    Counter(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldKind {
    Primitive {
        prim: PrimitiveType,
    },
    ClassRef {
        class: String,
    },
    FixedList {
        element: ElementKind,
        length: ListLength,
        could_be_string: bool,
    },
    DynamicList {
        element: ElementKind,
        counter: String,
    },
    Enum(StorageType),
    Bitfield(StorageType),
    StaticValue {
        prim: PrimitiveType,
        value: Literal,
    },
    Pad { width: PadWidth },
}

impl FieldKind {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Primitive { .. } => "primitive",
            FieldKind::ClassRef { .. } => "class-ref",
            FieldKind::FixedList { .. } => "fixed-list",
            FieldKind::DynamicList { .. } => "dynamic-list",
            FieldKind::Enum(_) => "enum",
            FieldKind::Bitfield(_) => "bitfield",
            FieldKind::StaticValue { .. } => "static-value",
            FieldKind::Pad { .. } => "padding",
        }
    }

    /// Single-value view of scalar-like kinds.
    pub fn as_element(&self) -> Option<ElementKind> {
        match self {
            FieldKind::Primitive { prim } => Some(ElementKind::Primitive { prim: *prim }),
            FieldKind::ClassRef { class } => Some(ElementKind::ClassRef {
                class: class.clone(),
            }),
            FieldKind::Enum(storage) => Some(ElementKind::Enum(storage.clone())),
            FieldKind::Bitfield(storage) => Some(ElementKind::Bitfield(storage.clone())),
            FieldKind::FixedList { .. }
            | FieldKind::DynamicList { .. }
            | FieldKind::StaticValue { .. }
            | FieldKind::Pad { .. } => None,
        }
    }

    /// Name of the counter attribute for counter-driven lists.
    pub fn counter_name(&self) -> Option<&str> {
        match self {
            FieldKind::DynamicList { counter, .. } => Some(counter),
            FieldKind::FixedList {
                length: ListLength::Counter(counter),
                ..
            } => Some(counter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitField {
    pub name: String,
    pub mask: u64,
    /// Count of trailing zero bits in `mask`.
    pub shift: u32,
    pub comment: Option<String>,
    /// Owning attribute.
    pub host: AttrIndex,
}

impl BitField {
    pub fn width_bits(&self) -> u32 {
        (self.mask >> self.shift).count_ones()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub comment: Option<String>,
    pub kind: FieldKind,
    pub default: Option<Literal>,
    pub serialize: bool,
    pub bitfields: Vec<BitField>,
    pub(crate) counter_for: Option<AttrIndex>,
}

impl Attribute {
    /// The list this attribute counts, set by the resolver.
    pub fn counter_for(&self) -> Option<AttrIndex> {
        self.counter_for
    }

    pub fn is_padding(&self) -> bool {
        matches!(self.kind, FieldKind::Pad { .. })
    }

    pub fn is_static(&self) -> bool {
        matches!(self.kind, FieldKind::StaticValue { .. })
    }

    /// True when the attribute takes part in marshal, unmarshal and size.
    pub fn on_wire(&self) -> bool {
        self.serialize && !self.is_static()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitialValue {
    pub field: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    pub attributes: Vec<Attribute>,
    pub initial_values: Vec<InitialValue>,
    pub comment: Option<String>,
    pub is_abstract: bool,
    pub alias_for: Option<String>,
}

impl ClassDecl {
    pub fn attribute(&self, name: &str) -> Option<(AttrIndex, &Attribute)> {
        self.attributes
            .iter()
            .enumerate()
            .find(|(_, attr)| attr.name == name)
    }

    pub fn is_alias(&self) -> bool {
        self.alias_for.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDecl {
    pub name: String,
    pub storage: PrimitiveType,
    pub values: Vec<(String, i64)>,
    pub comment: Option<String>,
}

impl EnumDecl {
    pub fn value_of(&self, variant: &str) -> Option<i64> {
        self.values
            .iter()
            .find(|(name, _)| name == variant)
            .map(|(_, value)| *value)
    }
}

/// Flat, name-indexed table of every class and enum in the schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaModel {
    pub package: Option<String>,
    pub(crate) classes: IndexMap<String, ClassDecl>,
    pub(crate) enums: IndexMap<String, EnumDecl>,
}

impl SchemaModel {
    pub fn from_schema(file: &SchemaFile) -> Result<SchemaModel, SchemaError> {
        let mut model = SchemaModel {
            package: file.package.clone(),
            ..Default::default()
        };

        for enum_def in &file.enums {
            let decl = convert_enum(enum_def)?;
            if model.enums.insert(decl.name.clone(), decl).is_some() {
                return Err(SchemaError::DuplicateEnum {
                    name: enum_def.name.clone(),
                });
            }
        }

        for class_def in &file.classes {
            let decl = convert_class(class_def)?;
            if model.classes.contains_key(&decl.name) {
                return Err(SchemaError::DuplicateClass {
                    class: decl.name.clone(),
                });
            }
            model.classes.insert(decl.name.clone(), decl);
        }

        model.validate()?;
        Ok(model)
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn class_index(&self, name: &str) -> Option<usize> {
        self.classes.get_index_of(name)
    }

    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.get(name)
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDecl> {
        self.enums.values()
    }

    /// The class followed by its ancestors, nearest first.
    pub fn lineage<'a>(&'a self, name: &str) -> Vec<&'a ClassDecl> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.class(name);
        while let Some(class) = current {
            if !seen.insert(class.name.as_str()) {
                break;
            }
            chain.push(class);
            current = class.parent.as_deref().and_then(|parent| self.class(parent));
        }
        chain
    }

    /// Follows `alias_for` links until a concrete class is reached.
    pub fn concrete_class<'a>(&'a self, name: &str) -> Option<&'a ClassDecl> {
        let mut seen = HashSet::new();
        let mut current = self.class(name)?;
        while let Some(target) = current.alias_for.as_deref() {
            if !seen.insert(current.name.as_str()) {
                return None;
            }
            current = self.class(target)?;
        }
        Some(current)
    }

    /// Fewest bytes an instance of `name` occupies on the wire: counted
    /// lists contribute nothing, everything else its fixed width.
    pub fn min_wire_size(&self, name: &str) -> usize {
        self.wire_floor(name, &mut HashMap::new())
    }

    /* Callers rely on containment cycles having been rejected */
    fn wire_floor(&self, name: &str, memo: &mut HashMap<String, usize>) -> usize {
        if let Some(size) = memo.get(name) {
            return *size;
        }
        let Some(class) = self.class(name) else {
            return 0;
        };
        let mut size = match class.alias_for.as_deref().or(class.parent.as_deref()) {
            Some(base) => self.wire_floor(base, memo),
            None => 0,
        };
        for attr in class.attributes.iter().filter(|a| a.on_wire()) {
            size += match &attr.kind {
                FieldKind::Primitive { prim } => prim.width(),
                FieldKind::Enum(storage) | FieldKind::Bitfield(storage) => storage.storage.width(),
                FieldKind::ClassRef { class } => self.wire_floor(class, memo),
                FieldKind::FixedList {
                    element,
                    length: ListLength::Literal(count),
                    ..
                } => {
                    let width = match element {
                        ElementKind::ClassRef { class } => self.wire_floor(class, memo),
                        other => other.fixed_width().unwrap_or(0),
                    };
                    width.saturating_mul(*count as usize)
                }
                FieldKind::Pad { width } => width.bytes(),
                FieldKind::FixedList { .. } | FieldKind::DynamicList { .. } | FieldKind::StaticValue { .. } => 0,
            };
        }
        memo.insert(name.to_string(), size);
        size
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for class in self.classes.values() {
            self.validate_links(class)?;
        }
        self.check_inheritance_cycles()?;
        for class in self.classes.values() {
            for (index, attr) in class.attributes.iter().enumerate() {
                self.validate_attribute(class, index, attr)?;
            }
        }
        self.check_containment_cycles()?;
        self.check_counted_elements()
    }

    /* Classes a value of `class` holds inline: its parent or alias target,
     * class references and literal-length arrays of classes. */
    fn embedded<'a>(&self, class: &'a ClassDecl) -> Vec<&'a str> {
        let mut inner: Vec<&str> = Vec::new();
        inner.extend(class.parent.as_deref());
        inner.extend(class.alias_for.as_deref());
        for attr in &class.attributes {
            match &attr.kind {
                FieldKind::ClassRef { class } => inner.push(class),
                FieldKind::FixedList {
                    element: ElementKind::ClassRef { class },
                    length: ListLength::Literal(_),
                    ..
                } => inner.push(class),
                _ => {}
            }
        }
        inner
    }

    /// No class may contain itself by value, directly or through others.
    fn check_containment_cycles(&self) -> Result<(), SchemaError> {
        let mut done: HashSet<&str> = HashSet::new();
        for start in self.classes.keys() {
            if done.contains(start.as_str()) {
                continue;
            }
            /* Depth-first walk keeping the current path and each frame's
             * remaining children */
            let mut path: Vec<&str> = Vec::new();
            let mut stack: Vec<(&str, Vec<&str>)> = Vec::new();
            if let Some(class) = self.classes.get(start) {
                path.push(start.as_str());
                stack.push((start.as_str(), self.embedded(class)));
            }
            while let Some((_, children)) = stack.last_mut() {
                let Some(child) = children.pop() else {
                    if let Some((name, _)) = stack.pop() {
                        done.insert(name);
                    }
                    path.pop();
                    continue;
                };
                if let Some(pos) = path.iter().position(|name| *name == child) {
                    let mut chain: Vec<String> = path[pos..].iter().map(|name| name.to_string()).collect();
                    chain.push(child.to_string());
                    return Err(SchemaError::ContainmentCycle { chain });
                }
                if done.contains(child) {
                    continue;
                }
                if let Some((name, class)) = self.classes.get_key_value(child) {
                    path.push(name.as_str());
                    stack.push((name.as_str(), self.embedded(class)));
                }
            }
        }
        Ok(())
    }

    /// Counted lists of classes need elements that consume input, so a
    /// decoded counter is bounded by the bytes that follow it.
    fn check_counted_elements(&self) -> Result<(), SchemaError> {
        let mut memo = HashMap::new();
        for class in self.classes.values() {
            for attr in class.attributes.iter().filter(|a| a.on_wire()) {
                let element = match &attr.kind {
                    FieldKind::DynamicList { element, .. }
                    | FieldKind::FixedList {
                        element,
                        length: ListLength::Counter(_),
                        ..
                    } => element,
                    _ => continue,
                };
                if let Some(target) = element.class_name() {
                    if self.wire_floor(target, &mut memo) == 0 {
                        return Err(SchemaError::EmptyListElement {
                            class: class.name.clone(),
                            attribute: attr.name.clone(),
                            element: target.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_links(&self, class: &ClassDecl) -> Result<(), SchemaError> {
        if let Some(parent) = &class.parent {
            if !self.classes.contains_key(parent) {
                return Err(SchemaError::UnknownParent {
                    class: class.name.clone(),
                    parent: parent.clone(),
                });
            }
        }
        if let Some(target) = &class.alias_for {
            if !self.classes.contains_key(target) {
                return Err(SchemaError::UnknownAliasTarget {
                    class: class.name.clone(),
                    target: target.clone(),
                });
            }
            if class.parent.is_some()
                || !class.attributes.is_empty()
                || !class.initial_values.is_empty()
            {
                return Err(SchemaError::AliasWithBody {
                    class: class.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Parent and alias links must form chains that end at a root.
    fn check_inheritance_cycles(&self) -> Result<(), SchemaError> {
        for class in self.classes.values() {
            let mut chain = vec![class.name.clone()];
            let mut current = class;
            loop {
                let next = current.parent.as_deref().or(current.alias_for.as_deref());
                let Some(next) = next else { break };
                if chain.iter().any(|name| name == next) {
                    chain.push(next.to_string());
                    return Err(SchemaError::CyclicInheritance { chain });
                }
                chain.push(next.to_string());
                match self.classes.get(next) {
                    Some(next_class) => current = next_class,
                    None => break,
                }
            }
        }
        Ok(())
    }

    fn validate_attribute(
        &self,
        class: &ClassDecl,
        index: AttrIndex,
        attr: &Attribute,
    ) -> Result<(), SchemaError> {
        let unknown_class = |target: &str| SchemaError::UnknownClassRef {
            class: class.name.clone(),
            attribute: attr.name.clone(),
            target: target.to_string(),
        };

        match &attr.kind {
            FieldKind::ClassRef { class: target } => {
                if !self.classes.contains_key(target) {
                    return Err(unknown_class(target));
                }
            }
            FieldKind::FixedList {
                element,
                length,
                could_be_string,
            } => {
                if let Some(target) = element.class_name() {
                    if !self.classes.contains_key(target) {
                        return Err(unknown_class(target));
                    }
                }
                if *could_be_string
                    && !matches!(
                        element,
                        ElementKind::Primitive {
                            prim: PrimitiveType::Uint8 | PrimitiveType::Int8
                        }
                    )
                {
                    return Err(SchemaError::TextOnNonByteList {
                        class: class.name.clone(),
                        attribute: attr.name.clone(),
                    });
                }
                if let ListLength::Counter(counter) = length {
                    self.validate_counter(class, index, attr, counter)?;
                }
            }
            FieldKind::DynamicList { element, counter } => {
                if let Some(target) = element.class_name() {
                    if !self.classes.contains_key(target) {
                        return Err(unknown_class(target));
                    }
                }
                self.validate_counter(class, index, attr, counter)?;
            }
            FieldKind::Primitive { .. }
            | FieldKind::Enum(_)
            | FieldKind::Bitfield(_)
            | FieldKind::StaticValue { .. }
            | FieldKind::Pad { .. } => {}
        }

        validate_bitfields(class, attr)
    }

    /// A counter that exists must be an integer primitive declared before
    /// the list. A missing counter is a resolver warning, not an error.
    fn validate_counter(
        &self,
        class: &ClassDecl,
        list_index: AttrIndex,
        list: &Attribute,
        counter: &str,
    ) -> Result<(), SchemaError> {
        let Some((counter_index, counter_attr)) = class.attribute(counter) else {
            return Ok(());
        };
        let is_integer = matches!(&counter_attr.kind, FieldKind::Primitive { prim } if prim.is_integer());
        if !is_integer {
            return Err(SchemaError::CounterNotInteger {
                class: class.name.clone(),
                attribute: list.name.clone(),
                counter: counter.to_string(),
            });
        }
        if counter_index > list_index {
            return Err(SchemaError::CounterAfterList {
                class: class.name.clone(),
                attribute: list.name.clone(),
                counter: counter.to_string(),
            });
        }
        Ok(())
    }
}

fn validate_bitfields(class: &ClassDecl, attr: &Attribute) -> Result<(), SchemaError> {
    if attr.bitfields.is_empty() {
        return Ok(());
    }
    let host = match &attr.kind {
        FieldKind::Primitive { prim } if prim.is_integer() => *prim,
        FieldKind::Primitive { .. } => {
            return Err(SchemaError::BitfieldOnNonPrimitive {
                class: class.name.clone(),
                attribute: attr.name.clone(),
                kind: "floating-point primitive",
            });
        }
        other => {
            return Err(SchemaError::BitfieldOnNonPrimitive {
                class: class.name.clone(),
                attribute: attr.name.clone(),
                kind: other.describe(),
            });
        }
    };

    let mut seen: Vec<&BitField> = Vec::with_capacity(attr.bitfields.len());
    for bitfield in &attr.bitfields {
        if bitfield.mask == 0 {
            return Err(SchemaError::ZeroBitfieldMask {
                class: class.name.clone(),
                attribute: attr.name.clone(),
                bitfield: bitfield.name.clone(),
            });
        }
        if bitfield.mask & !host.full_mask() != 0 {
            return Err(SchemaError::BitfieldMaskTooWide {
                class: class.name.clone(),
                attribute: attr.name.clone(),
                bitfield: bitfield.name.clone(),
                mask: bitfield.mask,
                width_bits: host.bits(),
            });
        }
        for earlier in &seen {
            if earlier.name == bitfield.name {
                return Err(SchemaError::DuplicateBitfield {
                    class: class.name.clone(),
                    attribute: attr.name.clone(),
                    bitfield: bitfield.name.clone(),
                });
            }
            if earlier.mask & bitfield.mask != 0 {
                return Err(SchemaError::OverlappingBitfields {
                    class: class.name.clone(),
                    attribute: attr.name.clone(),
                    first: earlier.name.clone(),
                    second: bitfield.name.clone(),
                });
            }
        }
        seen.push(bitfield);
    }
    Ok(())
}

fn convert_enum(def: &EnumDef) -> Result<EnumDecl, SchemaError> {
    let storage = PrimitiveType::from_name(&def.storage).map_err(|e| SchemaError::UnknownPrimitive {
        class: def.name.clone(),
        attribute: "storage".to_string(),
        type_name: e.0,
    })?;
    if !storage.is_integer() {
        return Err(SchemaError::EnumStorageNotInteger {
            name: def.name.clone(),
        });
    }
    Ok(EnumDecl {
        name: def.name.clone(),
        storage,
        values: def.values.iter().map(|v| (v.name.clone(), v.value)).collect(),
        comment: def.comment.clone(),
    })
}

fn convert_class(def: &ClassDef) -> Result<ClassDecl, SchemaError> {
    let mut attributes = Vec::with_capacity(def.attributes.len());
    let mut names = HashSet::new();
    for (index, attr_def) in def.attributes.iter().enumerate() {
        if !names.insert(attr_def.name.as_str()) {
            return Err(SchemaError::DuplicateAttribute {
                class: def.name.clone(),
                attribute: attr_def.name.clone(),
            });
        }
        attributes.push(convert_attribute(&def.name, index, attr_def)?);
    }

    let initial_values = def
        .initial_values
        .iter()
        .map(|iv| {
            Ok(InitialValue {
                field: iv.field.clone(),
                value: parse_literal(&def.name, &iv.field, &iv.value)?,
            })
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;

    Ok(ClassDecl {
        name: def.name.clone(),
        parent: def.parent.clone(),
        attributes,
        initial_values,
        comment: def.comment.clone(),
        is_abstract: def.is_abstract,
        alias_for: def.alias_for.clone(),
    })
}

fn convert_attribute(class: &str, index: AttrIndex, def: &AttributeDef) -> Result<Attribute, SchemaError> {
    let primitive = |type_name: &str| {
        PrimitiveType::from_name(type_name).map_err(|e| SchemaError::UnknownPrimitive {
            class: class.to_string(),
            attribute: def.name.clone(),
            type_name: e.0,
        })
    };
    let storage_type = |storage: &StorageTypeRef| -> Result<StorageType, SchemaError> {
        Ok(StorageType {
            declared: storage.type_name.clone(),
            resolved: storage.type_name.clone(),
            storage: primitive(&storage.storage)?,
            uid: storage.uid.clone(),
        })
    };
    let element = |element: &ElementDef| -> Result<ElementKind, SchemaError> {
        Ok(match element {
            ElementDef::Primitive(type_name) => ElementKind::Primitive {
                prim: primitive(type_name)?,
            },
            ElementDef::ClassRef(class) => ElementKind::ClassRef {
                class: class.clone(),
            },
            ElementDef::Enum(storage) => ElementKind::Enum(storage_type(storage)?),
            ElementDef::Bitfield(storage) => ElementKind::Bitfield(storage_type(storage)?),
        })
    };
    let invalid_fixed = |reason| SchemaError::InvalidFixedList {
        class: class.to_string(),
        attribute: def.name.clone(),
        reason,
    };

    let kind = match &def.kind {
        AttributeKind::Primitive(p) => FieldKind::Primitive {
            prim: primitive(&p.type_name)?,
        },
        AttributeKind::ClassRef(c) => FieldKind::ClassRef {
            class: c.class.clone(),
        },
        AttributeKind::FixedList(list) => {
            let length = match (list.length, &list.counter) {
                (Some(0), _) => return Err(invalid_fixed("fixed list length must be positive")),
                (Some(n), None) => ListLength::Literal(n),
                (None, Some(counter)) => ListLength::Counter(counter.clone()),
                (Some(_), Some(_)) => {
                    return Err(invalid_fixed("fixed list takes either a length or a counter, not both"));
                }
                (None, None) => return Err(invalid_fixed("fixed list needs a length or a counter")),
            };
            FieldKind::FixedList {
                element: element(&list.element)?,
                length,
                could_be_string: list.could_be_string,
            }
        }
        AttributeKind::DynamicList(list) => FieldKind::DynamicList {
            element: element(&list.element)?,
            counter: list.counter.clone(),
        },
        AttributeKind::Enum(storage) => FieldKind::Enum(storage_type(storage)?),
        AttributeKind::Bitfield(storage) => FieldKind::Bitfield(storage_type(storage)?),
        AttributeKind::StaticValue(value) => FieldKind::StaticValue {
            prim: primitive(&value.type_name)?,
            value: parse_literal(class, &def.name, &value.value)?,
        },
        AttributeKind::Pad16 => FieldKind::Pad { width: PadWidth::Pad16 },
        AttributeKind::Pad32 => FieldKind::Pad { width: PadWidth::Pad32 },
        AttributeKind::Pad64 => FieldKind::Pad { width: PadWidth::Pad64 },
    };

    let default = def
        .default
        .as_ref()
        .map(|literal| parse_literal(class, &def.name, literal))
        .transpose()?;

    let bitfields = def
        .bitfields
        .iter()
        .map(|bf| BitField {
            name: bf.name.clone(),
            mask: bf.mask,
            shift: bf.mask.trailing_zeros(),
            comment: bf.comment.clone(),
            host: index,
        })
        .collect();

    Ok(Attribute {
        name: def.name.clone(),
        comment: def.comment.clone(),
        kind,
        default,
        serialize: def.serialize,
        bitfields,
        counter_for: None,
    })
}

fn parse_literal(class: &str, attribute: &str, literal: &LiteralDef) -> Result<Literal, SchemaError> {
    literal.parse().map_err(|source| SchemaError::InvalidLiteral {
        class: class.to_string(),
        attribute: attribute.to_string(),
        source,
    })
}
