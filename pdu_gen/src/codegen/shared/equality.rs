/* Structural equality and hash traversal.
 *
 * One step list drives both algorithms so that equal instances always hash
 * equally. Padding, static values, non-serialized fields and linked counters
 * (whose wire value derives from the list length) are left out. */

use super::plan::CompareStep;
use crate::schema::{ClassDecl, FieldKind};

/// Starting accumulator for every class hash.
pub const HASH_SEED: u64 = 17;

/// Order-sensitive mixing step: `acc * 31 ^ h`, wrapping.
pub fn combine_hash(acc: u64, field_hash: u64) -> u64 {
    acc.wrapping_mul(31) ^ field_hash
}

pub fn compare_steps(class: &ClassDecl) -> Vec<CompareStep> {
    let mut steps = Vec::new();
    if let Some(parent) = &class.parent {
        steps.push(CompareStep::Parent {
            class: parent.clone(),
        });
    }

    for attr in &class.attributes {
        if !attr.on_wire() || attr.counter_for().is_some() {
            continue;
        }
        let field = attr.name.clone();
        match &attr.kind {
            FieldKind::Primitive { .. }
            | FieldKind::ClassRef { .. }
            | FieldKind::Enum(_)
            | FieldKind::Bitfield(_) => {
                if let Some(element) = attr.kind.as_element() {
                    steps.push(CompareStep::Value { field, element });
                }
            }
            FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => {
                steps.push(CompareStep::Elements {
                    field,
                    element: element.clone(),
                });
            }
            FieldKind::StaticValue { .. } | FieldKind::Pad { .. } => {}
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CrossReferenceResolver, SchemaModel};
    use pdu_types::{AliasTable, SchemaFile};

    #[test]
    fn combine_is_order_sensitive() {
        let ab = combine_hash(combine_hash(HASH_SEED, 1), 2);
        let ba = combine_hash(combine_hash(HASH_SEED, 2), 1);
        assert_ne!(ab, ba);
        assert_eq!(ab, combine_hash(combine_hash(HASH_SEED, 1), 2));
    }

    #[test]
    fn padding_statics_and_linked_counters_are_skipped() {
        let file: SchemaFile = serde_yml::from_str(
            r#"
classes:
  - name: Foo
    attributes:
      - { name: pad, kind: pad16 }
      - { name: count, kind: { primitive: { type: uint8 } } }
      - { name: items, kind: { dynamic-list: { element: { primitive: uint8 }, counter: count } } }
      - { name: scratch, kind: { primitive: { type: uint8 } }, serialize: false }
      - { name: LIMIT, kind: { static-value: { type: uint8, value: 3 } } }
      - { name: tag, kind: { primitive: { type: uint32 } } }
"#,
        )
        .unwrap();
        let model = SchemaModel::from_schema(&file).unwrap();
        let (schema, _) = CrossReferenceResolver::new(&AliasTable::new()).resolve(model);
        let steps = compare_steps(schema.class("Foo").unwrap());
        let fields: Vec<&str> = steps
            .iter()
            .map(|s| match s {
                CompareStep::Parent { class } => class.as_str(),
                CompareStep::Value { field, .. } | CompareStep::Elements { field, .. } => field.as_str(),
            })
            .collect();
        assert_eq!(fields, vec!["items", "tag"]);
    }
}
