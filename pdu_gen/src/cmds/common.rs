/* Common utilities shared between analyze and codegen commands */

use crate::config::GeneratorConfig;
use crate::error::ResolutionWarning;
use crate::schema::{CrossReferenceResolver, ResolvedSchema, SchemaLoader, SchemaModel, load_alias_table};
use anyhow::Context;
use pdu_types::GeneratorOptions;
use std::path::{Path, PathBuf};

/* A schema that passed validation and cross-reference resolution */
pub struct LoadedSchema {
  pub schema: ResolvedSchema,
  pub warnings: Vec<ResolutionWarning>,
  /* Options merged from every schema document */
  pub options: GeneratorOptions,
}

/* Load, merge, validate and resolve the given schema documents */
pub fn load_and_resolve(files: &[PathBuf], aliases: Option<&Path>, verbose: bool) -> anyhow::Result<LoadedSchema> {
  let mut loader = SchemaLoader::new();
  for file in files {
    loader.load_file(file, verbose)?;
  }
  if verbose {
    println!("\n[~] Loaded {} file(s)", loader.loaded_file_count());
  }

  let file = loader.into_schema();
  let options = file.options.clone();

  if verbose {
    println!("[~] Validating {} class(es), {} enum(s)...", file.classes.len(), file.enums.len());
  }
  let model = match SchemaModel::from_schema(&file) {
    Ok(model) => model,
    Err(err) => {
      if verbose {
        println!("[✗] Schema validation failed");
      }
      return Err(err).context("schema validation failed");
    }
  };
  if verbose {
    println!("[✓] Schema is well formed");
  }

  let alias_table = load_alias_table(aliases)?;
  if verbose && !alias_table.is_empty() {
    println!("[~] Alias table loaded");
  }

  let (schema, warnings) = CrossReferenceResolver::new(&alias_table).resolve(model);
  if verbose {
    if warnings.is_empty() {
      println!("[✓] Cross-references resolved");
    } else {
      println!("[~] Cross-references resolved with {} warning(s)", warnings.len());
    }
  }

  Ok(LoadedSchema {
    schema,
    warnings,
    options,
  })
}

pub fn print_warnings(warnings: &[ResolutionWarning]) {
  if warnings.is_empty() {
    println!("[✓] No resolution warnings");
    return;
  }
  println!("[!] {} resolution warning(s):", warnings.len());
  for warning in warnings {
    println!("  [!] {}", warning);
  }
}

/* Layer the generator options: schema documents, then the config file,
   then command-line overrides */
pub fn build_config(
  loaded: &LoadedSchema,
  config_file: Option<&Path>,
  package: Option<String>,
) -> anyhow::Result<GeneratorConfig> {
  let mut options = loaded.options.clone();

  if let Some(path) = config_file {
    let contents = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    let file_options: GeneratorOptions = serde_yml::from_str(&contents)
      .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
    options = options.merged(file_options);
  }

  options = options.merged(GeneratorOptions {
    package,
    ..Default::default()
  });

  Ok(GeneratorConfig::from_options(&options, loaded.schema.package()))
}
