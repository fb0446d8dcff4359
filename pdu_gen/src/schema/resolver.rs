use crate::error::ResolutionWarning;
use crate::schema::catalog::PrimitiveType;
use crate::schema::model::{
    AttrIndex, Attribute, ClassDecl, ElementKind, EnumDecl, FieldKind, SchemaModel, StorageType,
};
use indexmap::IndexMap;
use pdu_types::{AliasTable, Literal};
use serde_derive::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/* ============================================================================
   Resolved output
   ============================================================================ */

/* How a literal must be spelled by a backend */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiteralFormat {
    Numeric(PrimitiveType),
    EnumConstant {
        type_name: String,
        storage: PrimitiveType,
    },
}

impl LiteralFormat {
    pub fn storage(&self) -> PrimitiveType {
        match self {
            LiteralFormat::Numeric(prim) => *prim,
            LiteralFormat::EnumConstant { storage, .. } => *storage,
        }
    }
}

/* A default or initial value bound to the attribute it sets */
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInitialValue {
    pub field: String,
    /* Class that declares `field` */
    pub owner: String,
    /* 0 for the class itself, 1 for its parent, ... */
    pub depth: usize,
    pub value: Literal,
    /* Integer form of `value`; enum references are looked up in `enums:` */
    pub integer: Option<i128>,
    pub format: LiteralFormat,
}

/* Frozen schema: links are set and nothing hands out `&mut` any more */
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSchema {
    model: SchemaModel,
    initial_values: IndexMap<String, Vec<ResolvedInitialValue>>,
}

impl ResolvedSchema {
    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    pub fn package(&self) -> Option<&str> {
        self.model.package.as_deref()
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.model.class(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.model.classes()
    }

    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        self.model.enum_decl(name)
    }

    /* Defaults of the class's own attributes first, then its initial values */
    pub fn initial_values(&self, class: &str) -> &[ResolvedInitialValue] {
        self.initial_values
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/* ============================================================================
   Resolver
   ============================================================================ */

pub struct CrossReferenceResolver<'a> {
    aliases: &'a AliasTable,
}

impl<'a> CrossReferenceResolver<'a> {
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self { aliases }
    }

    pub fn resolve(&self, mut model: SchemaModel) -> (ResolvedSchema, Vec<ResolutionWarning>) {
        let mut warnings = Vec::new();

        for class in model.classes.values_mut() {
            link_counters(class, &mut warnings);
            self.resolve_aliases(class, &mut warnings);
        }

        let mut initial_values = IndexMap::new();
        for class in model.classes.values() {
            let resolved = resolve_initial_values(&model, class, &mut warnings);
            if !resolved.is_empty() {
                initial_values.insert(class.name.clone(), resolved);
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        info!(
            classes = model.classes.len(),
            warnings = warnings.len(),
            "cross-references resolved"
        );

        (
            ResolvedSchema {
                model,
                initial_values,
            },
            warnings,
        )
    }

    fn resolve_aliases(&self, class: &mut ClassDecl, warnings: &mut Vec<ResolutionWarning>) {
        for attr in &mut class.attributes {
            let Some(storage) = storage_type_mut(&mut attr.kind) else {
                continue;
            };
            let Some(uid) = storage.uid.clone() else {
                continue;
            };
            match self.aliases.lookup(&uid) {
                Some(alias) => {
                    debug!(class = %class.name, attribute = %attr.name, uid = %uid, alias, "uid alias resolved");
                    storage.resolved = alias.to_string();
                }
                None => warnings.push(ResolutionWarning::AliasNotFound {
                    class: class.name.clone(),
                    attribute: attr.name.clone(),
                    uid,
                    declared: storage.declared.clone(),
                }),
            }
        }
    }
}

fn storage_type_mut(kind: &mut FieldKind) -> Option<&mut StorageType> {
    match kind {
        FieldKind::Enum(storage) | FieldKind::Bitfield(storage) => Some(storage),
        FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => match element {
            ElementKind::Enum(storage) | ElementKind::Bitfield(storage) => Some(storage),
            ElementKind::Primitive { .. } | ElementKind::ClassRef { .. } => None,
        },
        FieldKind::Primitive { .. }
        | FieldKind::ClassRef { .. }
        | FieldKind::StaticValue { .. }
        | FieldKind::Pad { .. } => None,
    }
}

/* Point each counter at the list it counts. Integer-ness and ordering were
 * checked when the model was built. */
fn link_counters(class: &mut ClassDecl, warnings: &mut Vec<ResolutionWarning>) {
    let mut links: HashMap<AttrIndex, AttrIndex> = HashMap::new();

    for (list_index, list) in class.attributes.iter().enumerate() {
        let Some(counter) = list.kind.counter_name() else {
            continue;
        };
        let Some((counter_index, counter_attr)) = class.attribute(counter) else {
            warnings.push(ResolutionWarning::CounterNotFound {
                class: class.name.clone(),
                list: list.name.clone(),
                counter: counter.to_string(),
            });
            continue;
        };
        if !counter_attr.serialize {
            warnings.push(ResolutionWarning::CounterNotSerialized {
                class: class.name.clone(),
                list: list.name.clone(),
                counter: counter.to_string(),
            });
            continue;
        }
        if let Some(existing) = links.get(&counter_index) {
            warnings.push(ResolutionWarning::CounterAlreadyLinked {
                class: class.name.clone(),
                counter: counter.to_string(),
                existing: class.attributes[*existing].name.clone(),
                list: list.name.clone(),
            });
            continue;
        }
        links.insert(counter_index, list_index);
    }

    for (counter_index, list_index) in links {
        class.attributes[counter_index].counter_for = Some(list_index);
    }
}

/* Format used to spell a literal assigned to `attr`, or None when the
 * attribute cannot take a scalar value. */
fn literal_format(attr: &Attribute) -> Option<LiteralFormat> {
    match &attr.kind {
        FieldKind::Primitive { prim } => Some(LiteralFormat::Numeric(*prim)),
        FieldKind::Enum(storage) | FieldKind::Bitfield(storage) => Some(LiteralFormat::EnumConstant {
            type_name: storage.type_name().to_string(),
            storage: storage.storage,
        }),
        FieldKind::ClassRef { .. }
        | FieldKind::FixedList { .. }
        | FieldKind::DynamicList { .. }
        | FieldKind::StaticValue { .. }
        | FieldKind::Pad { .. } => None,
    }
}

fn resolve_initial_values(
    model: &SchemaModel,
    class: &ClassDecl,
    warnings: &mut Vec<ResolutionWarning>,
) -> Vec<ResolvedInitialValue> {
    let mut resolved = Vec::new();

    for attr in &class.attributes {
        let Some(default) = &attr.default else {
            continue;
        };
        let Some(format) = literal_format(attr) else {
            warnings.push(ResolutionWarning::InitialValueNotScalar {
                class: class.name.clone(),
                field: attr.name.clone(),
                kind: attr.kind.describe(),
            });
            continue;
        };
        if let Some(value) = bind(model, class, &attr.name, &class.name, 0, default, format, warnings) {
            resolved.push(value);
        }
    }

    let lineage = model.lineage(&class.name);
    for initial in &class.initial_values {
        let found = lineage.iter().enumerate().find_map(|(depth, decl)| {
            decl.attribute(&initial.field)
                .map(|(_, attr)| (depth, decl.name.as_str(), attr))
        });
        let Some((depth, owner, attr)) = found else {
            warnings.push(ResolutionWarning::InitialValueUnresolved {
                class: class.name.clone(),
                field: initial.field.clone(),
            });
            continue;
        };
        let Some(format) = literal_format(attr) else {
            warnings.push(ResolutionWarning::InitialValueNotScalar {
                class: class.name.clone(),
                field: initial.field.clone(),
                kind: attr.kind.describe(),
            });
            continue;
        };
        if let Some(value) = bind(model, class, &attr.name, owner, depth, &initial.value, format, warnings) {
            resolved.push(value);
        }
    }

    resolved
}

#[allow(clippy::too_many_arguments)]
fn bind(
    model: &SchemaModel,
    class: &ClassDecl,
    field: &str,
    owner: &str,
    depth: usize,
    value: &Literal,
    format: LiteralFormat,
    warnings: &mut Vec<ResolutionWarning>,
) -> Option<ResolvedInitialValue> {
    let integer = match value {
        Literal::EnumRef { type_name, variant } => {
            let target = match &format {
                LiteralFormat::EnumConstant { type_name, .. } => Some(type_name.as_str()),
                LiteralFormat::Numeric(_) => None,
            };
            match enum_value(model, type_name, target, variant) {
                Some(v) => Some(v as i128),
                None => {
                    warnings.push(ResolutionWarning::EnumVariantNotFound {
                        class: class.name.clone(),
                        field: field.to_string(),
                        type_name: type_name.clone(),
                        variant: variant.clone(),
                    });
                    return None;
                }
            }
        }
        Literal::Float(v) if format.storage().is_integer() => Some(*v as i128),
        other => other.as_integer(),
    };

    Some(ResolvedInitialValue {
        field: field.to_string(),
        owner: owner.to_string(),
        depth,
        value: value.clone(),
        integer,
        format,
    })
}

/* `Type.VARIANT` may be written with a qualified type path; fall back to
 * the last path segment and then to the attribute's own enum type. */
fn enum_value(model: &SchemaModel, type_name: &str, target: Option<&str>, variant: &str) -> Option<i64> {
    let short = type_name.rsplit('.').next().unwrap_or(type_name);
    [Some(type_name), Some(short), target]
        .into_iter()
        .flatten()
        .filter_map(|name| model.enum_decl(name))
        .find_map(|decl| decl.value_of(variant))
}
