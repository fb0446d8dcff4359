/* Diagnostic rendering: parent first, then every own field except padding
 * and static values. Text-capable byte arrays render as strings. */

use super::plan::DumpStep;
use crate::schema::{ClassDecl, FieldKind};

pub fn dump_steps(class: &ClassDecl) -> Vec<DumpStep> {
    let mut steps = Vec::new();
    if let Some(parent) = &class.parent {
        steps.push(DumpStep::Parent {
            class: parent.clone(),
        });
    }
    for attr in &class.attributes {
        let field = attr.name.clone();
        match &attr.kind {
            FieldKind::FixedList {
                could_be_string: true,
                ..
            } => steps.push(DumpStep::Text { field }),
            FieldKind::FixedList { element, .. } | FieldKind::DynamicList { element, .. } => {
                steps.push(DumpStep::Elements {
                    field,
                    element: element.clone(),
                })
            }
            FieldKind::Primitive { .. }
            | FieldKind::ClassRef { .. }
            | FieldKind::Enum(_)
            | FieldKind::Bitfield(_) => {
                if let Some(element) = attr.kind.as_element() {
                    steps.push(DumpStep::Value { field, element });
                }
            }
            FieldKind::StaticValue { .. } | FieldKind::Pad { .. } => {}
        }
    }
    steps
}
