//! Plan executor.
//!
//! [`Reflector`] runs the same [`ClassPlan`] step lists the code generators
//! translate, but interprets them against a [`Record`] tree. Generated code
//! and the reflector therefore agree on wire layout, size, equality, hash and
//! dump output by construction.

use crate::errors::{ReflectError, ReflectResult};
use crate::value::{Record, Scalar, Value};
use crate::wire::{Shortfall, WireReader, WireWriter};
use indexmap::IndexMap;
use pdu_gen::codegen::shared::equality::{combine_hash, HASH_SEED};
use pdu_gen::codegen::shared::{
    bitfield, BitfieldAccessor, ClassPlan, CompareStep, DumpStep, FieldPlan, Initializer, MarshalStep, PlanBuilder,
    SizeTerm, UnmarshalStep,
};
use pdu_gen::schema::{
    ElementKind, EmissionOrderPlanner, EmissionOrdering, FieldKind, ListLength, PrimitiveType, ResolvedSchema,
};
use pdu_gen::{CodegenError, GeneratorConfig};
use pdu_types::Literal;
use std::fmt::Write;
use tracing::{debug, info};

/// Schema-driven codec over dynamic values.
pub struct Reflector {
    /* Every class plan, definitions first */
    plans: IndexMap<String, ClassPlan>,
    /* Named values per enumeration, for dump and JSON output */
    enums: IndexMap<String, Vec<(String, i64)>>,
    /* Fewest wire bytes per class, bounding decoded element counts */
    floors: IndexMap<String, usize>,
    config: GeneratorConfig,
}

impl Reflector {
    /// Builds the plan for every class once. The schema model has already
    /// rejected by-value containment cycles, so instantiation terminates.
    pub fn new(schema: &ResolvedSchema, config: GeneratorConfig) -> ReflectResult<Self> {
        let order = EmissionOrderPlanner::new(schema.model())
            .plan(EmissionOrdering::DefinitionsFirst)
            .map_err(CodegenError::from)?;
        let plans = PlanBuilder::new(schema).build_all(&order)?;
        let enums = schema
            .model()
            .enums()
            .map(|decl| (decl.name.clone(), decl.values.clone()))
            .collect();
        let floors = plans
            .keys()
            .map(|name| (name.clone(), schema.model().min_wire_size(name)))
            .collect();
        info!(classes = plans.len(), endianness = ?config.endianness, "reflector ready");
        Ok(Self {
            plans,
            enums,
            floors,
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(String::as_str)
    }

    /// Plan of `class`, following alias chains to the concrete target.
    pub fn plan(&self, class: &str) -> ReflectResult<&ClassPlan> {
        let mut name = class;
        for _ in 0..=self.plans.len() {
            let plan = self.plans.get(name).ok_or_else(|| ReflectError::UnknownClass {
                class: name.to_string(),
            })?;
            match &plan.alias_for {
                Some(target) => name = target.as_str(),
                None => return Ok(plan),
            }
        }
        Err(ReflectError::UnknownClass {
            class: class.to_string(),
        })
    }

    /// Name of the enumeration value `raw`, if the schema declares one.
    pub fn enum_name(&self, type_name: &str, raw: Scalar) -> Option<&str> {
        let raw = raw.as_i128()?;
        self.enums
            .get(type_name)?
            .iter()
            .find(|(_, value)| *value as i128 == raw)
            .map(|(name, _)| name.as_str())
    }

    /* ---------- construction ---------- */

    /// A fresh instance: zero values, then attribute defaults, then initial
    /// values, parent view first. Defaults and initial values are skipped
    /// when the configuration turns them off.
    pub fn instantiate(&self, class: &str) -> ReflectResult<Record> {
        let plan = self.plan(class)?;
        let mut record = Record::new(plan.class_name.as_str());
        if let Some(parent) = &plan.parent {
            record.parent = Some(Box::new(self.instantiate(parent)?));
        }
        for field in &plan.fields {
            if let Some(zero) = self.zero_field(&field.kind)? {
                record.fields.insert(field.name.clone(), zero);
            }
        }
        if self.config.emit_initial_values {
            for init in &plan.initializers {
                apply_initializer(&mut record, init)?;
            }
        }
        Ok(record)
    }

    /* None for kinds without storage (padding, static values) */
    fn zero_field(&self, kind: &FieldKind) -> ReflectResult<Option<Value>> {
        let value = match kind {
            FieldKind::FixedList {
                element,
                length: ListLength::Literal(count),
                ..
            } => {
                let zero = self.zero_element(element)?;
                Value::List(vec![zero; *count as usize])
            }
            FieldKind::FixedList { .. } | FieldKind::DynamicList { .. } => Value::List(Vec::new()),
            FieldKind::Primitive { prim } => Value::Scalar(Scalar::zero(*prim)),
            FieldKind::ClassRef { class } => Value::Record(self.instantiate(class)?),
            FieldKind::Enum(storage) => Value::Enum {
                type_name: storage.type_name().to_string(),
                raw: Scalar::zero(storage.storage),
            },
            FieldKind::Bitfield(storage) => Value::Bits {
                type_name: storage.type_name().to_string(),
                raw: Scalar::zero(storage.storage),
            },
            FieldKind::StaticValue { .. } | FieldKind::Pad { .. } => return Ok(None),
        };
        Ok(Some(value))
    }

    fn zero_element(&self, element: &ElementKind) -> ReflectResult<Value> {
        Ok(match element {
            ElementKind::Primitive { prim } => Value::Scalar(Scalar::zero(*prim)),
            ElementKind::ClassRef { class } => Value::Record(self.instantiate(class)?),
            ElementKind::Enum(storage) => Value::Enum {
                type_name: storage.type_name().to_string(),
                raw: Scalar::zero(storage.storage),
            },
            ElementKind::Bitfield(storage) => Value::Bits {
                type_name: storage.type_name().to_string(),
                raw: Scalar::zero(storage.storage),
            },
        })
    }

    /* ---------- marshal ---------- */

    /// Encodes `record` parent view first. Linked counters are written from
    /// the live list length, never from the stored counter value.
    pub fn marshal(&self, record: &Record) -> ReflectResult<Vec<u8>> {
        let mut out = WireWriter::new(self.config.endianness);
        self.marshal_into(record, &mut out)?;
        debug!(class = %record.class, bytes = out.len(), "record marshalled");
        Ok(out.into_bytes())
    }

    fn marshal_into(&self, record: &Record, out: &mut WireWriter) -> ReflectResult<()> {
        let plan = self.plan(&record.class)?;
        for step in &plan.marshal {
            match step {
                MarshalStep::Parent { class } => {
                    let parent = self.parent_view(record, class)?;
                    self.marshal_into(parent, out)?;
                }
                MarshalStep::Value { field, element } => {
                    self.put_element(plan, field, element, own(record, plan, field)?, out)?;
                }
                MarshalStep::LiveCount { field, prim, list } => {
                    let live = list_of(record, plan, list)?.len();
                    let count = Scalar::count(*prim, live).ok_or_else(|| ReflectError::CounterOverflow {
                        class: plan.class_name.clone(),
                        field: field.clone(),
                        count: live,
                    })?;
                    out.put(&count);
                }
                MarshalStep::FixedElements { field, element, count } => {
                    let items = list_of(record, plan, field)?;
                    if items.len() as u64 != *count {
                        return Err(ReflectError::FixedLengthMismatch {
                            class: plan.class_name.clone(),
                            field: field.clone(),
                            expected: *count,
                            found: items.len(),
                        });
                    }
                    for item in items {
                        self.put_element(plan, field, element, item, out)?;
                    }
                }
                MarshalStep::LiveElements { field, element } => {
                    for item in list_of(record, plan, field)? {
                        self.put_element(plan, field, element, item, out)?;
                    }
                }
                MarshalStep::Pad { bytes } => out.put_zeros(*bytes),
            }
        }
        Ok(())
    }

    fn put_element(
        &self,
        plan: &ClassPlan,
        field: &str,
        element: &ElementKind,
        value: &Value,
        out: &mut WireWriter,
    ) -> ReflectResult<()> {
        if let ElementKind::ClassRef { class } = element {
            let nested = value
                .as_record()
                .ok_or_else(|| shape(plan, field, element, value))?;
            self.expect_class(nested, class)?;
            return self.marshal_into(nested, out);
        }
        out.put(&stored_scalar(plan, field, element, value)?);
        Ok(())
    }

    /* ---------- unmarshal ---------- */

    /// Decodes one `class` instance from the front of `data` and returns it
    /// with the number of bytes consumed. Trailing bytes are left alone.
    pub fn unmarshal(&self, class: &str, data: &[u8]) -> ReflectResult<(Record, usize)> {
        let plan = self.plan(class)?;
        if plan.is_abstract {
            return Err(ReflectError::AbstractRoot {
                class: plan.class_name.clone(),
            });
        }
        let mut input = WireReader::new(data, self.config.endianness);
        let record = self.decode(plan, &mut input)?;
        debug!(class = %plan.class_name, consumed = input.position(), "record unmarshalled");
        Ok((record, input.position()))
    }

    fn decode(&self, plan: &ClassPlan, input: &mut WireReader<'_>) -> ReflectResult<Record> {
        /* Fields that are not on the wire keep their constructor values */
        let mut record = self.instantiate(&plan.class_name)?;
        self.decode_into(plan, &mut record, input)?;
        Ok(record)
    }

    fn decode_into(&self, plan: &ClassPlan, record: &mut Record, input: &mut WireReader<'_>) -> ReflectResult<()> {
        for step in &plan.unmarshal {
            match step {
                UnmarshalStep::Parent { class } => {
                    let parent_plan = self.plan(class)?;
                    let parent = record
                        .parent
                        .as_deref_mut()
                        .ok_or_else(|| ReflectError::MissingParent {
                            class: plan.class_name.clone(),
                        })?;
                    self.decode_into(parent_plan, parent, input)?;
                }
                UnmarshalStep::Value { field, element } => {
                    let value = self.read_element(plan, field, element, input)?;
                    record.fields.insert(field.clone(), value);
                }
                UnmarshalStep::FixedElements { field, element, count } => {
                    check_room(plan, field, self.element_floor(element), *count, input)?;
                    let mut items = Vec::with_capacity(*count as usize);
                    for _ in 0..*count {
                        items.push(self.read_element(plan, field, element, input)?);
                    }
                    record.fields.insert(field.clone(), Value::List(items));
                }
                UnmarshalStep::CountedElements { field, element, counter } => {
                    let count = match counter {
                        Some(counter) => record
                            .get(counter)
                            .and_then(Value::raw)
                            .ok_or_else(|| missing(plan, counter))?
                            .as_count(),
                        None => 0,
                    };
                    check_room(plan, field, self.element_floor(element), count, input)?;
                    let mut items = Vec::with_capacity(count.min(input.remaining() as u64) as usize);
                    for _ in 0..count {
                        items.push(self.read_element(plan, field, element, input)?);
                    }
                    record.fields.insert(field.clone(), Value::List(items));
                }
                UnmarshalStep::SkipPad { bytes } => {
                    input.skip(*bytes).map_err(|s| truncated(plan, "padding", s))?;
                }
            }
        }
        Ok(())
    }

    /* Fewest bytes one element occupies on the wire */
    fn element_floor(&self, element: &ElementKind) -> usize {
        match element {
            ElementKind::ClassRef { class } => self.floors.get(class).copied().unwrap_or(0),
            other => other.fixed_width().unwrap_or(0),
        }
    }

    fn read_element(
        &self,
        plan: &ClassPlan,
        field: &str,
        element: &ElementKind,
        input: &mut WireReader<'_>,
    ) -> ReflectResult<Value> {
        let read = |input: &mut WireReader<'_>, prim: PrimitiveType| {
            input.read(prim).map_err(|s| truncated(plan, field, s))
        };
        Ok(match element {
            ElementKind::Primitive { prim } => Value::Scalar(read(input, *prim)?),
            ElementKind::Enum(storage) => Value::Enum {
                type_name: storage.type_name().to_string(),
                raw: read(input, storage.storage)?,
            },
            ElementKind::Bitfield(storage) => Value::Bits {
                type_name: storage.type_name().to_string(),
                raw: read(input, storage.storage)?,
            },
            ElementKind::ClassRef { class } => {
                let nested = self.plan(class)?;
                Value::Record(self.decode(nested, input)?)
            }
        })
    }

    /* ---------- size ---------- */

    /// Exact encoded length of `record`.
    pub fn marshalled_size(&self, record: &Record) -> ReflectResult<usize> {
        let plan = self.plan(&record.class)?;
        let mut size = 0;
        for term in &plan.size {
            size += match term {
                SizeTerm::Parent { class } => self.marshalled_size(self.parent_view(record, class)?)?,
                SizeTerm::Fixed { bytes, .. } => *bytes,
                SizeTerm::Nested { field, class } => {
                    let value = own(record, plan, field)?;
                    let nested = value.as_record().ok_or_else(|| ReflectError::FieldShape {
                        class: plan.class_name.clone(),
                        field: field.clone(),
                        expected: format!("record {}", class),
                        found: value.describe(),
                    })?;
                    self.marshalled_size(nested)?
                }
                SizeTerm::NestedElements { field, class } => {
                    let mut total = 0;
                    for item in list_of(record, plan, field)? {
                        let nested = item.as_record().ok_or_else(|| ReflectError::FieldShape {
                            class: plan.class_name.clone(),
                            field: field.clone(),
                            expected: format!("record {}", class),
                            found: item.describe(),
                        })?;
                        total += self.marshalled_size(nested)?;
                    }
                    total
                }
                SizeTerm::LiveElements { field, element_width } => list_of(record, plan, field)?.len() * element_width,
            };
        }
        Ok(size)
    }

    /* ---------- equality and hash ---------- */

    /// Structural equality: padding, static values, non-serialized fields
    /// and linked counters do not take part.
    pub fn equals(&self, a: &Record, b: &Record) -> ReflectResult<bool> {
        let plan = self.plan(&a.class)?;
        if plan.class_name != self.plan(&b.class)?.class_name {
            return Ok(false);
        }
        for step in &plan.comparison {
            let same = match step {
                CompareStep::Parent { class } => {
                    self.equals(self.parent_view(a, class)?, self.parent_view(b, class)?)?
                }
                CompareStep::Value { field, .. } => self.value_eq(own(a, plan, field)?, own(b, plan, field)?)?,
                CompareStep::Elements { field, .. } => {
                    let (left, right) = (list_of(a, plan, field)?, list_of(b, plan, field)?);
                    if left.len() != right.len() {
                        false
                    } else {
                        let mut same = true;
                        for (x, y) in left.iter().zip(right) {
                            if !self.value_eq(x, y)? {
                                same = false;
                                break;
                            }
                        }
                        same
                    }
                }
            };
            if !same {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn value_eq(&self, a: &Value, b: &Value) -> ReflectResult<bool> {
        match (a, b) {
            (Value::Record(x), Value::Record(y)) => self.equals(x, y),
            (Value::Scalar(x), Value::Scalar(y)) => Ok(x.same_bits(y)),
            _ => Ok(a == b),
        }
    }

    /// Order-sensitive hash over the same fields equality compares, so
    /// equal records hash equally.
    pub fn hash(&self, record: &Record) -> ReflectResult<u64> {
        let plan = self.plan(&record.class)?;
        let mut acc = HASH_SEED;
        for step in &plan.comparison {
            match step {
                CompareStep::Parent { class } => {
                    acc = combine_hash(acc, self.hash(self.parent_view(record, class)?)?);
                }
                CompareStep::Value { field, .. } => {
                    acc = combine_hash(acc, self.value_hash(own(record, plan, field)?)?);
                }
                CompareStep::Elements { field, .. } => {
                    for item in list_of(record, plan, field)? {
                        acc = combine_hash(acc, self.value_hash(item)?);
                    }
                }
            }
        }
        Ok(acc)
    }

    fn value_hash(&self, value: &Value) -> ReflectResult<u64> {
        match value {
            Value::Scalar(raw) | Value::Enum { raw, .. } | Value::Bits { raw, .. } => Ok(raw.hash_term()),
            Value::Record(record) => self.hash(record),
            Value::List(items) => {
                let mut acc = HASH_SEED;
                for item in items {
                    acc = combine_hash(acc, self.value_hash(item)?);
                }
                Ok(acc)
            }
        }
    }

    /* ---------- dump ---------- */

    /// Indented `name : value` listing, nested records two spaces deeper.
    pub fn dump(&self, record: &Record) -> ReflectResult<String> {
        let mut out = String::new();
        self.dump_into(record, &mut out, 0)?;
        Ok(out)
    }

    fn dump_into(&self, record: &Record, out: &mut String, indent: usize) -> ReflectResult<()> {
        let plan = self.plan(&record.class)?;
        for step in &plan.dump {
            match step {
                DumpStep::Parent { class } => self.dump_into(self.parent_view(record, class)?, out, indent)?,
                DumpStep::Value { field, .. } => match own(record, plan, field)? {
                    Value::Record(nested) => {
                        let _ = writeln!(out, "{:indent$}{} :", "", field, indent = indent);
                        self.dump_into(nested, out, indent + 2)?;
                    }
                    value => {
                        let _ = writeln!(out, "{:indent$}{} : {}", "", field, self.render(value), indent = indent);
                    }
                },
                DumpStep::Elements { field, element } => {
                    let items = list_of(record, plan, field)?;
                    if let ElementKind::ClassRef { .. } = element {
                        for (index, item) in items.iter().enumerate() {
                            let _ = writeln!(out, "{:indent$}{}[{}] :", "", field, index, indent = indent);
                            let nested = item.as_record().ok_or_else(|| shape(plan, field, element, item))?;
                            self.dump_into(nested, out, indent + 2)?;
                        }
                    } else {
                        let rendered: Vec<String> = items
                            .iter()
                            .map(|item| match item {
                                Value::Scalar(s) => s.debug_text(),
                                other => self.render(other),
                            })
                            .collect();
                        let _ = writeln!(out, "{:indent$}{} : [{}]", "", field, rendered.join(", "), indent = indent);
                    }
                }
                DumpStep::Text { field } => {
                    let text = list_text(own(record, plan, field)?);
                    let _ = writeln!(out, "{:indent$}{} : {:?}", "", field, text, indent = indent);
                }
            }
        }
        Ok(())
    }

    /// Single-line rendering of a value; enumeration values show their name.
    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::Scalar(s) => s.to_string(),
            Value::Enum { type_name, raw } => match self.enum_name(type_name, *raw) {
                Some(name) => format!("{} ({})", name, raw),
                None => raw.to_string(),
            },
            Value::Bits { raw, .. } => raw.to_string(),
            Value::Record(record) => record.class.clone(),
            Value::List(items) => {
                let rendered: Vec<String> = items.iter().map(|item| self.render(item)).collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }

    /* ---------- bitfields ---------- */

    /// `(host & mask) >> shift` of the named bitfield.
    pub fn get_bits(&self, record: &Record, name: &str) -> ReflectResult<u64> {
        let (owner, accessor) = self.accessor(&record.class, name)?;
        let host = record
            .view(&owner.class_name)
            .and_then(|view| view.fields.get(&accessor.host))
            .ok_or_else(|| missing(owner, &accessor.host))?;
        let raw = host.raw().ok_or_else(|| ReflectError::FieldShape {
            class: owner.class_name.clone(),
            field: accessor.host.clone(),
            expected: accessor.host_prim.name().to_string(),
            found: host.describe(),
        })?;
        Ok(bitfield::extract(raw.to_bits(), accessor.mask))
    }

    /// Replaces the bits under the named mask; every other bit of the host
    /// is preserved and excess high bits of `value` are dropped.
    pub fn set_bits(&self, record: &mut Record, name: &str, value: u64) -> ReflectResult<()> {
        let (owner, accessor) = self.accessor(&record.class, name)?;
        let host = record
            .view_mut(&owner.class_name)
            .and_then(|view| view.fields.get_mut(&accessor.host))
            .ok_or_else(|| missing(owner, &accessor.host))?;
        let Some(raw) = host.raw() else {
            return Err(ReflectError::FieldShape {
                class: owner.class_name.clone(),
                field: accessor.host.clone(),
                expected: accessor.host_prim.name().to_string(),
                found: host.describe(),
            });
        };
        let bits = bitfield::insert(raw.to_bits(), accessor.mask, value);
        replace_raw(host, Scalar::from_bits(raw.prim(), bits));
        Ok(())
    }

    /* Searches the class, then its ancestors */
    fn accessor(&self, class: &str, name: &str) -> ReflectResult<(&ClassPlan, &BitfieldAccessor)> {
        let mut plan = self.plan(class)?;
        loop {
            if let Some(accessor) = plan.bitfields.iter().find(|a| a.name == name) {
                return Ok((plan, accessor));
            }
            match &plan.parent {
                Some(parent) => plan = self.plan(parent)?,
                None => {
                    return Err(ReflectError::UnknownBitfield {
                        class: class.to_string(),
                        name: name.to_string(),
                    })
                }
            }
        }
    }

    /* ---------- text ---------- */

    /// Contents of a text-capable byte list up to the first NUL.
    pub fn text(&self, record: &Record, field: &str) -> ReflectResult<String> {
        let (owner, _) = self.text_field(&record.class, field)?;
        let value = record
            .view(&owner.class_name)
            .and_then(|view| view.fields.get(field))
            .ok_or_else(|| missing(owner, field))?;
        Ok(list_text(value))
    }

    /// Fixed-length lists take at most `length - 1` bytes and are zero
    /// filled; counter-sized lists become the text plus a NUL.
    pub fn set_text(&self, record: &mut Record, field: &str, text: &str) -> ReflectResult<()> {
        let (owner, plan_field) = self.text_field(&record.class, field)?;
        let FieldKind::FixedList { element, length, .. } = &plan_field.kind else {
            return Err(ReflectError::NotText {
                class: owner.class_name.clone(),
                field: field.to_string(),
            });
        };
        let prim = element.storage_primitive().unwrap_or(PrimitiveType::Uint8);
        let byte = |b: u8| Value::Scalar(Scalar::from_integer(prim, b as i128));

        let slot = record
            .view_mut(&owner.class_name)
            .and_then(|view| view.fields.get_mut(field))
            .ok_or_else(|| missing(owner, field))?;
        let Value::List(items) = slot else {
            return Err(ReflectError::FieldShape {
                class: owner.class_name.clone(),
                field: field.to_string(),
                expected: "list".to_string(),
                found: slot.describe(),
            });
        };
        match length {
            ListLength::Literal(_) => {
                let limit = items.len().saturating_sub(1);
                let bytes = &text.as_bytes()[..text.len().min(limit)];
                for (index, item) in items.iter_mut().enumerate() {
                    *item = byte(bytes.get(index).copied().unwrap_or(0));
                }
            }
            ListLength::Counter(_) => {
                *items = text.bytes().chain(std::iter::once(0)).map(byte).collect();
            }
        }
        Ok(())
    }

    fn text_field(&self, class: &str, field: &str) -> ReflectResult<(&ClassPlan, &FieldPlan)> {
        let mut plan = self.plan(class)?;
        loop {
            if let Some(found) = plan.field(field) {
                if !found.text_capable {
                    return Err(ReflectError::NotText {
                        class: plan.class_name.clone(),
                        field: field.to_string(),
                    });
                }
                return Ok((plan, found));
            }
            match &plan.parent {
                Some(parent) => plan = self.plan(parent)?,
                None => {
                    return Err(ReflectError::MissingField {
                        class: class.to_string(),
                        field: field.to_string(),
                    })
                }
            }
        }
    }

    /* ---------- helpers ---------- */

    fn parent_view<'r>(&self, record: &'r Record, class: &str) -> ReflectResult<&'r Record> {
        let parent = record.parent().ok_or_else(|| ReflectError::MissingParent {
            class: record.class.clone(),
        })?;
        self.expect_class(parent, class)?;
        Ok(parent)
    }

    fn expect_class(&self, record: &Record, class: &str) -> ReflectResult<()> {
        let expected = &self.plan(class)?.class_name;
        let found = &self.plan(&record.class)?.class_name;
        if expected != found {
            return Err(ReflectError::ClassMismatch {
                expected: expected.clone(),
                found: found.clone(),
            });
        }
        Ok(())
    }
}

fn apply_initializer(record: &mut Record, init: &Initializer) -> ReflectResult<()> {
    let mut target = record;
    for _ in 0..init.depth {
        let Some(parent) = target.parent.as_deref_mut() else {
            return Err(ReflectError::MissingParent {
                class: init.owner.clone(),
            });
        };
        target = parent;
    }
    let slot = target
        .fields
        .get_mut(&init.field)
        .ok_or_else(|| ReflectError::MissingField {
            class: init.owner.clone(),
            field: init.field.clone(),
        })?;

    let storage = init.format.storage();
    let raw = match &init.value {
        Literal::Float(v) if storage.is_float() => Scalar::from_float(storage, *v),
        _ => Scalar::from_integer(storage, init.integer.unwrap_or(0)),
    };
    replace_raw(slot, raw);
    Ok(())
}

fn replace_raw(value: &mut Value, new_raw: Scalar) {
    match value {
        Value::Scalar(raw) | Value::Enum { raw, .. } | Value::Bits { raw, .. } => *raw = new_raw,
        Value::Record(_) | Value::List(_) => {}
    }
}

fn list_text(value: &Value) -> String {
    let bytes: Vec<u8> = value
        .as_list()
        .unwrap_or_default()
        .iter()
        .map(|item| item.raw().map_or(0, |raw| raw.to_bits() as u8))
        .take_while(|b| *b != 0)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/* Fail before allocating when the elements cannot all be present */
fn check_room(plan: &ClassPlan, field: &str, width: usize, count: u64, input: &WireReader<'_>) -> ReflectResult<()> {
    let needed = count.saturating_mul(width as u64);
    if needed > input.remaining() as u64 {
        return Err(truncated(
            plan,
            field,
            Shortfall {
                needed: usize::try_from(needed).unwrap_or(usize::MAX),
                remaining: input.remaining(),
            },
        ));
    }
    Ok(())
}

fn stored_scalar(plan: &ClassPlan, field: &str, element: &ElementKind, value: &Value) -> ReflectResult<Scalar> {
    let (expected, raw) = match (element, value) {
        (ElementKind::Primitive { prim }, Value::Scalar(raw)) => (*prim, *raw),
        (ElementKind::Enum(storage), Value::Enum { raw, .. })
        | (ElementKind::Bitfield(storage), Value::Bits { raw, .. }) => (storage.storage, *raw),
        _ => return Err(shape(plan, field, element, value)),
    };
    if raw.prim() != expected {
        return Err(shape(plan, field, element, value));
    }
    Ok(raw)
}

fn own<'r>(record: &'r Record, plan: &ClassPlan, field: &str) -> ReflectResult<&'r Value> {
    record.fields.get(field).ok_or_else(|| missing(plan, field))
}

fn list_of<'r>(record: &'r Record, plan: &ClassPlan, field: &str) -> ReflectResult<&'r [Value]> {
    match own(record, plan, field)? {
        Value::List(items) => Ok(items),
        other => Err(ReflectError::FieldShape {
            class: plan.class_name.clone(),
            field: field.to_string(),
            expected: "list".to_string(),
            found: other.describe(),
        }),
    }
}

fn missing(plan: &ClassPlan, field: &str) -> ReflectError {
    ReflectError::MissingField {
        class: plan.class_name.clone(),
        field: field.to_string(),
    }
}

fn shape(plan: &ClassPlan, field: &str, element: &ElementKind, found: &Value) -> ReflectError {
    let expected = match element {
        ElementKind::Primitive { prim } => prim.name().to_string(),
        ElementKind::ClassRef { class } => format!("record {}", class),
        ElementKind::Enum(storage) => format!("enum {}", storage.type_name()),
        ElementKind::Bitfield(storage) => format!("bitfield {}", storage.type_name()),
    };
    ReflectError::FieldShape {
        class: plan.class_name.clone(),
        field: field.to_string(),
        expected,
        found: found.describe(),
    }
}

fn truncated(plan: &ClassPlan, field: &str, shortfall: Shortfall) -> ReflectError {
    ReflectError::Truncated {
        class: plan.class_name.clone(),
        field: field.to_string(),
        needed: shortfall.needed,
        remaining: shortfall.remaining,
    }
}
