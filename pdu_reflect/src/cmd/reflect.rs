/* Binary for decoding PDU binary data against a schema */

use anyhow::Context;
use clap::{Parser as ClapParser, ValueEnum};
use pdu_gen::cmds::common::{build_config, load_and_resolve, print_warnings};
use pdu_reflect::{record_to_json, FormatOptions, Reflector};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
  Json,
  Dump,
}

#[derive(ClapParser)]
#[command(name = "pdu-reflect")]
#[command(about = "Decode PDU binary data against a schema and print the result")]
struct Args {
  /* Schema file(s) to load, merged in order */
  #[arg(short, long, required = true)]
  schema: Vec<PathBuf>,

  /* UID alias table */
  #[arg(short, long)]
  aliases: Option<PathBuf>,

  /* YAML file with generator options (endianness) */
  #[arg(long)]
  config: Option<PathBuf>,

  /* Class to decode */
  #[arg(short, long, required = true)]
  class: String,

  /* Binary data file to decode */
  #[arg(short, long, required = true)]
  data_file: PathBuf,

  /* Output format */
  #[arg(short, long, value_enum, default_value = "json")]
  format: OutputFormat,

  /* Pretty print JSON output */
  #[arg(short, long)]
  pretty: bool,

  /* Print enumeration values as numbers */
  #[arg(long)]
  numeric_enums: bool,

  /* Show loading progress and resolution warnings */
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env())
    .init();

  let args = Args::parse();

  /* Load, validate and resolve the schema */
  let loaded = load_and_resolve(&args.schema, args.aliases.as_deref(), args.verbose)?;
  if args.verbose {
    print_warnings(&loaded.warnings);
  }
  let config = build_config(&loaded, args.config.as_deref(), None)?;

  let reflector = Reflector::new(&loaded.schema, config)?;

  let data = std::fs::read(&args.data_file)
    .with_context(|| format!("failed to read data file '{}'", args.data_file.display()))?;

  let (record, consumed) = reflector
    .unmarshal(&args.class, &data)
    .with_context(|| format!("failed to decode '{}' as {}", args.data_file.display(), args.class))?;
  if consumed < data.len() {
    tracing::warn!(consumed, total = data.len(), "trailing bytes after decoded record");
  }

  match args.format {
    OutputFormat::Dump => print!("{}", reflector.dump(&record)?),
    OutputFormat::Json => {
      let options = FormatOptions {
        numeric_enums: args.numeric_enums,
        ..Default::default()
      };
      let json = record_to_json(&reflector, &record, &options);
      if args.pretty {
        println!("{}", serde_json::to_string_pretty(&json)?);
      } else {
        println!("{}", serde_json::to_string(&json)?);
      }
    }
  }

  Ok(())
}
