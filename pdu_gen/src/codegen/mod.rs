pub mod c;
pub mod c_gen;
pub mod rust;
pub mod rust_gen;
pub mod shared;
pub mod ts;
pub mod ts_gen;

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::schema::{EmissionOrderPlanner, EmissionOrdering, ResolvedSchema};
use crate::codegen::shared::{ClassPlan, PlanBuilder};
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

pub const OUTPUT_DIR: &str = "generated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    C,
    Rust,
    #[value(name = "typescript", alias = "ts")]
    TypeScript,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Rust => "rust",
            Language::TypeScript => "typescript",
        }
    }
}

/// One rendered output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Everything a backend needs to render one schema.
pub struct GenerationUnit<'a> {
    pub schema: &'a ResolvedSchema,
    pub config: &'a GeneratorConfig,
    pub order: Vec<String>,
    pub plans: IndexMap<String, ClassPlan>,
}

impl<'a> GenerationUnit<'a> {
    /// Plans in emission order.
    pub fn ordered_plans(&self) -> impl Iterator<Item = &ClassPlan> {
        self.order.iter().filter_map(|name| self.plans.get(name))
    }

    pub fn plan(&self, class: &str) -> Result<&ClassPlan, CodegenError> {
        self.plans
            .get(class)
            .ok_or_else(|| CodegenError::MissingPlan(class.to_string()))
    }
}

pub trait Backend {
    fn language(&self) -> Language;

    /// Ordering the target language needs for its definitions.
    fn ordering(&self) -> EmissionOrdering;

    fn render(&self, unit: &GenerationUnit) -> Result<Vec<GeneratedFile>, CodegenError>;
}

pub fn backend_for(language: Language) -> Box<dyn Backend> {
    match language {
        Language::C => Box::new(c::CBackend),
        Language::Rust => Box::new(rust::RustBackend),
        Language::TypeScript => Box::new(ts::TypeScriptBackend),
    }
}

/// Orders the classes the way `ordering` demands and plans each one.
pub fn prepare_unit<'a>(
    schema: &'a ResolvedSchema,
    config: &'a GeneratorConfig,
    ordering: EmissionOrdering,
) -> Result<GenerationUnit<'a>, CodegenError> {
    let order = EmissionOrderPlanner::new(schema.model()).plan(ordering)?;
    let plans = PlanBuilder::new(schema).build_all(&order)?;
    Ok(GenerationUnit {
        schema,
        config,
        order,
        plans,
    })
}

/// Runs one backend over the frozen schema.
pub fn generate(
    schema: &ResolvedSchema,
    config: &GeneratorConfig,
    language: Language,
) -> Result<Vec<GeneratedFile>, CodegenError> {
    let backend = backend_for(language);
    let unit = prepare_unit(schema, config, backend.ordering())?;
    let files = backend.render(&unit)?;
    info!(
        language = language.name(),
        classes = unit.order.len(),
        files = files.len(),
        "code generation finished"
    );
    Ok(files)
}
