use crate::error::SchemaError;
use crate::schema::model::{ElementKind, FieldKind, ListLength, SchemaModel};
use serde_derive::Serialize;
use std::collections::BTreeSet;

/// Constraint a backend places on the order in which classes are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionOrdering {
    /// Every class follows its parent (and an alias follows its target).
    ParentsFirst,
    /// Additionally, every class embedded by value precedes its user.
    DefinitionsFirst,
}

/// Topological class ordering using Kahn's algorithm. Ties are broken by
/// declaration order so the output is stable across runs.
pub struct EmissionOrderPlanner<'a> {
    model: &'a SchemaModel,
}

impl<'a> EmissionOrderPlanner<'a> {
    pub fn new(model: &'a SchemaModel) -> Self {
        Self { model }
    }

    pub fn plan(&self, ordering: EmissionOrdering) -> Result<Vec<String>, SchemaError> {
        let names: Vec<&str> = self.model.class_names().collect();
        let count = names.len();

        // dependents[i] lists the classes that must wait for class i
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];

        for (index, name) in names.iter().enumerate() {
            let mut deps = self.dependencies(name, ordering);
            deps.sort_unstable();
            deps.dedup();
            for dep in deps {
                if dep == index {
                    return Err(SchemaError::DefinitionCycle {
                        classes: vec![name.to_string()],
                    });
                }
                dependents[dep].push(index);
                in_degree[index] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(count);

        while let Some(next) = ready.pop_first() {
            order.push(names[next].to_string());
            for &dependent in &dependents[next] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != count {
            let stuck = (0..count)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| names[i].to_string())
                .collect();
            return Err(SchemaError::DefinitionCycle { classes: stuck });
        }

        Ok(order)
    }

    fn dependencies(&self, name: &str, ordering: EmissionOrdering) -> Vec<usize> {
        let Some(class) = self.model.class(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = Vec::new();
        deps.extend(class.parent.as_deref());
        deps.extend(class.alias_for.as_deref());

        if ordering == EmissionOrdering::DefinitionsFirst {
            for attr in &class.attributes {
                match &attr.kind {
                    FieldKind::ClassRef { class } => deps.push(class),
                    FieldKind::FixedList {
                        element: ElementKind::ClassRef { class },
                        length: ListLength::Literal(_),
                        ..
                    } => deps.push(class),
                    // Counted lists are held by pointer and need no definition.
                    FieldKind::FixedList { .. }
                    | FieldKind::DynamicList { .. }
                    | FieldKind::Primitive { .. }
                    | FieldKind::Enum(_)
                    | FieldKind::Bitfield(_)
                    | FieldKind::StaticValue { .. }
                    | FieldKind::Pad { .. } => {}
                }
            }
        }

        deps.into_iter()
            .filter_map(|dep| self.model.class_index(dep))
            .collect()
    }
}
