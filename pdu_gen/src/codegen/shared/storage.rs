/* Enum and packed-bitfield types referenced by the schema.
 *
 * Each named type becomes one storage wrapper in every backend, so a name
 * must be used with one storage width throughout. */

use crate::error::CodegenError;
use crate::schema::{ElementKind, EnumDecl, FieldKind, PrimitiveType, ResolvedSchema, StorageType};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct StorageWrapper<'a> {
    pub name: String,
    pub storage: PrimitiveType,
    pub is_bitfield: bool,
    pub decl: Option<&'a EnumDecl>,
}

impl StorageWrapper<'_> {
    /// Named values in declaration order.
    pub fn values(&self) -> &[(String, i64)] {
        self.decl.map(|d| d.values.as_slice()).unwrap_or(&[])
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.values().iter().any(|(name, _)| name == variant)
    }
}

pub fn collect_storage_types(schema: &ResolvedSchema) -> Result<IndexMap<String, StorageWrapper<'_>>, CodegenError> {
    let mut out: IndexMap<String, StorageWrapper<'_>> = IndexMap::new();

    for decl in schema.model().enums() {
        if schema.class(&decl.name).is_some() {
            return Err(CodegenError::NameClash(decl.name.clone()));
        }
        out.insert(
            decl.name.clone(),
            StorageWrapper {
                name: decl.name.clone(),
                storage: decl.storage,
                is_bitfield: false,
                decl: Some(decl),
            },
        );
    }

    for class in schema.classes() {
        for attr in &class.attributes {
            let (storage, is_bitfield) = match &attr.kind {
                FieldKind::Enum(s) => (s, false),
                FieldKind::Bitfield(s) => (s, true),
                FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => {
                    match element {
                        ElementKind::Enum(s) => (s, false),
                        ElementKind::Bitfield(s) => (s, true),
                        ElementKind::Primitive { .. } | ElementKind::ClassRef { .. } => continue,
                    }
                }
                FieldKind::Primitive { .. }
                | FieldKind::ClassRef { .. }
                | FieldKind::StaticValue { .. }
                | FieldKind::Pad { .. } => continue,
            };
            register(schema, &mut out, storage, is_bitfield)?;
        }
    }
    Ok(out)
}

fn register<'a>(
    schema: &'a ResolvedSchema,
    out: &mut IndexMap<String, StorageWrapper<'a>>,
    storage: &StorageType,
    is_bitfield: bool,
) -> Result<(), CodegenError> {
    let name = storage.type_name();
    if schema.class(name).is_some() {
        return Err(CodegenError::NameClash(name.to_string()));
    }
    match out.get(name) {
        Some(existing) if existing.storage != storage.storage => Err(CodegenError::ConflictingStorage {
            type_name: name.to_string(),
            first: existing.storage.name(),
            second: storage.storage.name(),
        }),
        Some(_) => Ok(()),
        None => {
            out.insert(
                name.to_string(),
                StorageWrapper {
                    name: name.to_string(),
                    storage: storage.storage,
                    is_bitfield,
                    decl: schema.enum_decl(name),
                },
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CrossReferenceResolver, SchemaModel};
    use pdu_types::{AliasTable, SchemaFile};

    fn schema(yaml: &str) -> ResolvedSchema {
        let file: SchemaFile = serde_yml::from_str(yaml).unwrap();
        let model = SchemaModel::from_schema(&file).unwrap();
        CrossReferenceResolver::new(&AliasTable::new()).resolve(model).0
    }

    #[test]
    fn conflicting_widths_are_rejected() {
        let schema = schema(
            r#"
classes:
  - name: A
    attributes:
      - { name: x, kind: { enum: { type: Kind, storage: uint8 } } }
      - { name: y, kind: { enum: { type: Kind, storage: uint16 } } }
"#,
        );
        assert!(matches!(
            collect_storage_types(&schema),
            Err(CodegenError::ConflictingStorage { first: "uint8", second: "uint16", .. })
        ));
    }

    #[test]
    fn declared_enums_come_first() {
        let schema = schema(
            r#"
enums:
  - { name: Kind, storage: uint8, values: [ { name: A, value: 1 } ] }
classes:
  - name: A
    attributes:
      - { name: f, kind: { bitfield: { type: Flags, storage: uint16 } } }
      - { name: k, kind: { enum: { type: Kind, storage: uint8 } } }
"#,
        );
        let types = collect_storage_types(&schema).unwrap();
        let names: Vec<&str> = types.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Kind", "Flags"]);
        assert!(types["Kind"].has_variant("A"));
        assert!(types["Flags"].is_bitfield);
    }
}
