/* Marshal, unmarshal and size instruction sequences.
 *
 * Phase one delegates to the parent (when there is one); phase two walks the
 * class's own attributes in declaration order. Non-serialized fields and
 * static values never touch the wire. */

use super::plan::{MarshalStep, SizeTerm, UnmarshalStep};
use crate::schema::{ClassDecl, ElementKind, FieldKind, ListLength};

pub fn marshal_steps(class: &ClassDecl) -> Vec<MarshalStep> {
  let mut steps = Vec::with_capacity(class.attributes.len() + 1);
  if let Some(parent) = &class.parent {
    steps.push(MarshalStep::Parent { class: parent.clone() });
  }

  for attr in class.attributes.iter().filter(|a| a.on_wire()) {
    let field = attr.name.clone();
    let step = match &attr.kind {
      FieldKind::Primitive { prim } => match attr.counter_for() {
        Some(list) => MarshalStep::LiveCount {
          field,
          prim: *prim,
          list: class.attributes[list].name.clone(),
        },
        None => MarshalStep::Value {
          field,
          element: ElementKind::Primitive { prim: *prim },
        },
      },
      FieldKind::ClassRef { .. } | FieldKind::Enum(_) | FieldKind::Bitfield(_) => {
        match attr.kind.as_element() {
          Some(element) => MarshalStep::Value { field, element },
          None => continue,
        }
      }
      FieldKind::FixedList { element, length: ListLength::Literal(count), .. } => {
        MarshalStep::FixedElements {
          field,
          element: element.clone(),
          count: *count,
        }
      }
      FieldKind::FixedList { element, length: ListLength::Counter(_), .. }
      | FieldKind::DynamicList { element, .. } => MarshalStep::LiveElements {
        field,
        element: element.clone(),
      },
      FieldKind::Pad { width } => MarshalStep::Pad { bytes: width.bytes() },
      FieldKind::StaticValue { .. } => continue,
    };
    steps.push(step);
  }
  steps
}

pub fn unmarshal_steps(class: &ClassDecl) -> Vec<UnmarshalStep> {
  let mut steps = Vec::with_capacity(class.attributes.len() + 1);
  if let Some(parent) = &class.parent {
    steps.push(UnmarshalStep::Parent { class: parent.clone() });
  }

  for attr in class.attributes.iter().filter(|a| a.on_wire()) {
    let field = attr.name.clone();
    let step = match &attr.kind {
      FieldKind::Primitive { .. }
      | FieldKind::ClassRef { .. }
      | FieldKind::Enum(_)
      | FieldKind::Bitfield(_) => match attr.kind.as_element() {
        Some(element) => UnmarshalStep::Value { field, element },
        None => continue,
      },
      FieldKind::FixedList { element, length: ListLength::Literal(count), .. } => {
        UnmarshalStep::FixedElements {
          field,
          element: element.clone(),
          count: *count,
        }
      }
      FieldKind::FixedList { element, length: ListLength::Counter(counter), .. }
      | FieldKind::DynamicList { element, counter } => UnmarshalStep::CountedElements {
        field,
        element: element.clone(),
        counter: wire_counter(class, counter),
      },
      FieldKind::Pad { width } => UnmarshalStep::SkipPad { bytes: width.bytes() },
      FieldKind::StaticValue { .. } => continue,
    };
    steps.push(step);
  }
  steps
}

/* The counter only drives decoding when it is itself read from the wire */
fn wire_counter(class: &ClassDecl, counter: &str) -> Option<String> {
  class
    .attribute(counter)
    .filter(|(_, attr)| attr.on_wire())
    .map(|(_, attr)| attr.name.clone())
}

pub fn size_terms(class: &ClassDecl) -> Vec<SizeTerm> {
  let mut terms = Vec::with_capacity(class.attributes.len() + 1);
  if let Some(parent) = &class.parent {
    terms.push(SizeTerm::Parent { class: parent.clone() });
  }

  for attr in class.attributes.iter().filter(|a| a.on_wire()) {
    let field = attr.name.clone();
    let term = match &attr.kind {
      FieldKind::Primitive { prim } => SizeTerm::Fixed { field, bytes: prim.width() },
      FieldKind::Enum(storage) | FieldKind::Bitfield(storage) => SizeTerm::Fixed {
        field,
        bytes: storage.storage.width(),
      },
      FieldKind::ClassRef { class } => SizeTerm::Nested {
        field,
        class: class.clone(),
      },
      FieldKind::FixedList { element, length, .. } => match (element, length) {
        (ElementKind::ClassRef { class }, _) => SizeTerm::NestedElements {
          field,
          class: class.clone(),
        },
        (element, ListLength::Literal(count)) => SizeTerm::Fixed {
          field,
          bytes: element.fixed_width().unwrap_or(0) * (*count as usize),
        },
        (element, ListLength::Counter(_)) => SizeTerm::LiveElements {
          field,
          element_width: element.fixed_width().unwrap_or(0),
        },
      },
      FieldKind::DynamicList { element, .. } => match element {
        ElementKind::ClassRef { class } => SizeTerm::NestedElements {
          field,
          class: class.clone(),
        },
        other => SizeTerm::LiveElements {
          field,
          element_width: other.fixed_width().unwrap_or(0),
        },
      },
      FieldKind::Pad { width } => SizeTerm::Fixed { field, bytes: width.bytes() },
      FieldKind::StaticValue { .. } => continue,
    };
    terms.push(term);
  }
  terms
}

/* Size known without an instance, or None when any term is data dependent */
pub fn static_size(terms: &[SizeTerm], parent_size: Option<usize>) -> Option<usize> {
  let mut total = 0usize;
  for term in terms {
    total += match term {
      SizeTerm::Parent { .. } => parent_size?,
      SizeTerm::Fixed { bytes, .. } => *bytes,
      SizeTerm::Nested { .. } | SizeTerm::NestedElements { .. } | SizeTerm::LiveElements { .. } => {
        return None;
      }
    };
  }
  Some(total)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::{CrossReferenceResolver, PrimitiveType, ResolvedSchema, SchemaModel};
  use pdu_types::{AliasTable, SchemaFile};

  fn resolved(yaml: &str) -> ResolvedSchema {
    let file: SchemaFile = serde_yml::from_str(yaml).unwrap();
    let model = SchemaModel::from_schema(&file).unwrap();
    CrossReferenceResolver::new(&AliasTable::new()).resolve(model).0
  }

  const FOO: &str = r#"
classes:
  - name: Header
    attributes:
      - { name: pad, kind: pad16 }
  - name: Foo
    parent: Header
    attributes:
      - { name: count, kind: { primitive: { type: uint16 } } }
      - { name: items, kind: { dynamic-list: { element: { primitive: uint8 }, counter: count } } }
      - { name: hidden, kind: { primitive: { type: uint32 } }, serialize: false }
      - { name: VERSION, kind: { static-value: { type: uint8, value: 7 } } }
"#;

  #[test]
  fn counter_writes_live_length() {
    let schema = resolved(FOO);
    let steps = marshal_steps(schema.class("Foo").unwrap());
    let u8_element = ElementKind::Primitive { prim: PrimitiveType::Uint8 };
    assert_eq!(
      steps,
      vec![
        MarshalStep::Parent { class: "Header".into() },
        MarshalStep::LiveCount {
          field: "count".into(),
          prim: PrimitiveType::Uint16,
          list: "items".into(),
        },
        MarshalStep::LiveElements { field: "items".into(), element: u8_element },
      ]
    );
    assert_eq!(
      marshal_steps(schema.class("Header").unwrap()),
      vec![MarshalStep::Pad { bytes: 2 }]
    );
  }

  #[test]
  fn unmarshal_reads_counter_then_counted_elements() {
    let schema = resolved(FOO);
    let steps = unmarshal_steps(schema.class("Foo").unwrap());
    assert_eq!(steps.len(), 3);
    assert!(matches!(&steps[1], UnmarshalStep::Value { field, .. } if field == "count"));
    assert!(matches!(
      &steps[2],
      UnmarshalStep::CountedElements { counter: Some(counter), .. } if counter == "count"
    ));
  }

  #[test]
  fn missing_counter_decodes_empty() {
    let schema = resolved(
      r#"
classes:
  - name: Foo
    attributes:
      - { name: items, kind: { dynamic-list: { element: { primitive: uint8 }, counter: nope } } }
"#,
    );
    let steps = unmarshal_steps(schema.class("Foo").unwrap());
    assert!(matches!(&steps[0], UnmarshalStep::CountedElements { counter: None, .. }));
  }

  #[test]
  fn size_terms_cover_every_wire_field() {
    let schema = resolved(FOO);
    let header = size_terms(schema.class("Header").unwrap());
    assert_eq!(static_size(&header, None), Some(2));

    let foo = size_terms(schema.class("Foo").unwrap());
    assert_eq!(
      foo,
      vec![
        SizeTerm::Parent { class: "Header".into() },
        SizeTerm::Fixed { field: "count".into(), bytes: 2 },
        SizeTerm::LiveElements { field: "items".into(), element_width: 1 },
      ]
    );
    assert_eq!(static_size(&foo, Some(2)), None);
  }

  #[test]
  fn fixed_lists_have_literal_sizes() {
    let schema = resolved(
      r#"
classes:
  - name: Marking
    attributes:
      - { name: charset, kind: { primitive: { type: uint8 } } }
      - { name: chars, kind: { fixed-list: { element: { primitive: uint8 }, length: 11, could-be-string: true } } }
      - { name: pad, kind: pad32 }
"#,
    );
    let terms = size_terms(schema.class("Marking").unwrap());
    assert_eq!(static_size(&terms, None), Some(1 + 11 + 4));
  }
}
