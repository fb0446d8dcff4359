/* Analyze command - report ordering, warnings, configuration and plans */

use super::common::{build_config, load_and_resolve, print_warnings};
use crate::codegen::prepare_unit;
use crate::codegen::shared::{ClassPlan, PlanSet};
use crate::error::CodegenError;
use crate::schema::{EmissionOrderPlanner, EmissionOrdering};
use anyhow::Context;
use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
  Json,
  Yaml,
}

pub struct AnalyzeArgs {
  pub files: Vec<PathBuf>,
  pub aliases: Option<PathBuf>,
  pub config: Option<PathBuf>,
  pub print_plan: bool,
  pub plan_format: PlanFormat,
  pub class: Option<String>,
}

/* Execute the analyze command */
pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
  println!("PDU Generator - Schema Analysis Tool");
  println!("====================================\n");

  let loaded = load_and_resolve(&args.files, args.aliases.as_deref(), true)?;
  println!();
  print_warnings(&loaded.warnings);

  let config = build_config(&loaded, args.config.as_deref(), None)?;
  println!("\n[~] Generator configuration:");
  let rendered = serde_yml::to_string(&config).context("failed to render configuration")?;
  for line in rendered.lines() {
    println!("    {}", line);
  }

  let planner = EmissionOrderPlanner::new(loaded.schema.model());
  for ordering in [EmissionOrdering::ParentsFirst, EmissionOrdering::DefinitionsFirst] {
    let order = planner.plan(ordering).context("emission ordering failed")?;
    println!("\n[~] Emission order ({:?}):", ordering);
    for (index, name) in order.iter().enumerate() {
      println!("  {:>3}. {}", index + 1, name);
    }
  }

  if args.print_plan {
    let unit = prepare_unit(&loaded.schema, &config, EmissionOrdering::ParentsFirst)?;
    let classes: Vec<&ClassPlan> = match &args.class {
      Some(name) => {
        if loaded.schema.class(name).is_none() {
          return Err(CodegenError::UnknownClass(name.clone()).into());
        }
        vec![unit.plan(name)?]
      }
      None => unit.ordered_plans().collect(),
    };
    let set = PlanSet::new(&unit.order, classes);
    println!("\n[~] Class plans:");
    match args.plan_format {
      PlanFormat::Json => println!("{}", serde_json::to_string_pretty(&set).context("failed to render plans")?),
      PlanFormat::Yaml => print!("{}", serde_yml::to_string(&set).context("failed to render plans")?),
    }
  }

  Ok(())
}
