//! Builds [`ClassPlan`]s from the frozen schema.

use super::plan::{ClassPlan, FieldPlan};
use super::{bitfield, codec, dump, equality, initial};
use crate::error::CodegenError;
use crate::schema::{ClassDecl, FieldKind, ResolvedSchema};
use indexmap::IndexMap;
use tracing::debug;

pub struct PlanBuilder<'a> {
    schema: &'a ResolvedSchema,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(schema: &'a ResolvedSchema) -> Self {
        Self { schema }
    }

    pub fn build_class(&self, name: &str) -> Result<ClassPlan, CodegenError> {
        let class = self
            .schema
            .class(name)
            .ok_or_else(|| CodegenError::UnknownClass(name.to_string()))?;

        if let Some(target) = &class.alias_for {
            debug!(class = name, target = %target, "alias plan");
            return Ok(alias_plan(class, target));
        }

        let plan = ClassPlan {
            class_name: class.name.clone(),
            parent: class.parent.clone(),
            alias_for: None,
            is_abstract: class.is_abstract,
            comment: class.comment.clone(),
            fields: field_plans(class),
            marshal: codec::marshal_steps(class),
            unmarshal: codec::unmarshal_steps(class),
            size: codec::size_terms(class),
            comparison: equality::compare_steps(class),
            dump: dump::dump_steps(class),
            bitfields: bitfield::accessors(class),
            initializers: initial::initializers(self.schema, class),
            constants: initial::constants(class),
        };
        debug!(
            class = name,
            marshal_steps = plan.marshal.len(),
            bitfields = plan.bitfields.len(),
            "class plan built"
        );
        Ok(plan)
    }

    /// Plans for every class in `order`, keyed and ordered the same way.
    pub fn build_all(&self, order: &[String]) -> Result<IndexMap<String, ClassPlan>, CodegenError> {
        order
            .iter()
            .map(|name| Ok((name.clone(), self.build_class(name)?)))
            .collect()
    }
}

fn alias_plan(class: &ClassDecl, target: &str) -> ClassPlan {
    ClassPlan {
        class_name: class.name.clone(),
        parent: None,
        alias_for: Some(target.to_string()),
        is_abstract: class.is_abstract,
        comment: class.comment.clone(),
        fields: Vec::new(),
        marshal: Vec::new(),
        unmarshal: Vec::new(),
        size: Vec::new(),
        comparison: Vec::new(),
        dump: Vec::new(),
        bitfields: Vec::new(),
        initializers: Vec::new(),
        constants: Vec::new(),
    }
}

fn field_plans(class: &ClassDecl) -> Vec<FieldPlan> {
    class
        .attributes
        .iter()
        .map(|attr| FieldPlan {
            name: attr.name.clone(),
            comment: attr.comment.clone(),
            kind: attr.kind.clone(),
            serialize: attr.serialize,
            counter_for: attr
                .counter_for()
                .map(|index| class.attributes[index].name.clone()),
            text_capable: matches!(
                attr.kind,
                FieldKind::FixedList {
                    could_be_string: true,
                    ..
                }
            ),
        })
        .collect()
}
