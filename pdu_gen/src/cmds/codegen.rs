/* Codegen command - generate codec source from PDU schemas */

use super::common::{build_config, load_and_resolve};
use crate::codegen::{self, GeneratedFile, Language};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct CodegenArgs {
  pub files: Vec<PathBuf>,
  pub aliases: Option<PathBuf>,
  pub language: Language,
  pub output_dir: PathBuf,
  pub package: Option<String>,
  pub config: Option<PathBuf>,
  pub verbose: bool,
}

/* Execute the codegen command; returns the paths written */
pub fn run(args: CodegenArgs) -> anyhow::Result<Vec<PathBuf>> {
  if args.verbose {
    println!("PDU Generator - Code Generation Tool");
    println!("====================================\n");
    println!("[~] Configuration:");
    println!("  Language: {}", args.language.name());
    println!("  Output directory: {}", args.output_dir.display());
    println!("  Input files: {}", args.files.len());
    for file in &args.files {
      println!("    - {}", file.display());
    }
    if let Some(aliases) = &args.aliases {
      println!("  Alias table: {}", aliases.display());
    }
    println!();
  }

  let loaded = load_and_resolve(&args.files, args.aliases.as_deref(), args.verbose)?;
  if args.verbose {
    for warning in &loaded.warnings {
      println!("  [!] {}", warning);
    }
  }

  let config = build_config(&loaded, args.config.as_deref(), args.package.clone())?;
  if args.verbose {
    println!("\n[*] Starting code generation for {} (package '{}')...", args.language.name(), config.package);
  }

  let files = codegen::generate(&loaded.schema, &config, args.language)
    .with_context(|| format!("{} code generation failed", args.language.name()))?;

  let written = write_files(&args.output_dir, &files)?;
  if args.verbose {
    for path in &written {
      println!("[✓] Wrote {}", path.display());
    }
  }
  info!(files = written.len(), output = %args.output_dir.display(), "generated sources written");
  Ok(written)
}

pub fn write_files(output_dir: &Path, files: &[GeneratedFile]) -> anyhow::Result<Vec<PathBuf>> {
  std::fs::create_dir_all(output_dir)
    .with_context(|| format!("failed to create output directory '{}'", output_dir.display()))?;

  let mut written = Vec::with_capacity(files.len());
  for file in files {
    let path = output_dir.join(&file.path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(&path, &file.contents).with_context(|| format!("failed to write '{}'", path.display()))?;
    written.push(path);
  }
  Ok(written)
}
