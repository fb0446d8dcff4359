/* Constructor initializers and class constants */

use super::plan::{Initializer, StaticConstant};
use crate::schema::{ClassDecl, FieldKind, LiteralFormat, ResolvedSchema};
use pdu_types::Literal;

/* Attribute defaults first, then initial values, so the latter win */
pub fn initializers(schema: &ResolvedSchema, class: &ClassDecl) -> Vec<Initializer> {
    schema.initial_values(&class.name).to_vec()
}

pub fn constants(class: &ClassDecl) -> Vec<StaticConstant> {
    class
        .attributes
        .iter()
        .filter_map(|attr| match &attr.kind {
            FieldKind::StaticValue { prim, value } => Some(StaticConstant {
                name: attr.name.clone(),
                prim: *prim,
                value: value.clone(),
                comment: attr.comment.clone(),
            }),
            _ => None,
        })
        .collect()
}

/// Numeric source text for a literal assigned to a field of `format`.
/// Integers stay integral; floats always carry a decimal point.
pub fn numeric_text(value: &Literal, integer: Option<i128>, format: &LiteralFormat) -> String {
    let storage = format.storage();
    if storage.is_float() {
        return match value {
            Literal::Float(v) => format!("{:?}", v),
            _ => format!("{}.0", integer.unwrap_or(0)),
        };
    }
    match integer {
        Some(v) => v.to_string(),
        None => "0".to_string(),
    }
}
