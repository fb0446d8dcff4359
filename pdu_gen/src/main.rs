use clap::{Parser, Subcommand};
use pdu_gen::cmds;
use pdu_gen::cmds::analyze::{AnalyzeArgs, PlanFormat};
use pdu_gen::cmds::codegen::CodegenArgs;
use pdu_gen::codegen::{Language, OUTPUT_DIR};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "pdu-gen")]
#[command(about = "Codec generator for PDU wire protocols", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate codec source from schema files */
    Codegen {
        /* Input YAML schema files, merged in order */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* UID alias table */
        #[arg(short = 'a', long = "aliases", value_name = "FILE")]
        aliases: Option<PathBuf>,

        /* Target language for code generation */
        #[arg(short = 'l', long = "language", value_enum)]
        language: Language,

        /* Output directory for generated code */
        #[arg(short = 'o', long = "output", value_name = "DIR", default_value = OUTPUT_DIR)]
        output_dir: PathBuf,

        /* Package name, overriding the schema and config file */
        #[arg(long = "package", value_name = "NAME")]
        package: Option<String>,

        /* YAML file with generator options */
        #[arg(long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Validate schema files and show ordering, warnings and plans */
    Analyze {
        /* Input YAML schema files, merged in order */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* UID alias table */
        #[arg(short = 'a', long = "aliases", value_name = "FILE")]
        aliases: Option<PathBuf>,

        /* YAML file with generator options */
        #[arg(long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Print the serialized class plans */
        #[arg(long = "print-plan")]
        print_plan: bool,

        /* Format to use when printing plans */
        #[arg(long = "plan-format", value_enum, default_value = "json")]
        plan_format: PlanFormat,

        /* Only print the plan of this class */
        #[arg(long = "class", value_name = "NAME")]
        class: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            files,
            aliases,
            language,
            output_dir,
            package,
            config,
            verbose,
        } => {
            cmds::codegen::run(CodegenArgs {
                files,
                aliases,
                language,
                output_dir,
                package,
                config,
                verbose,
            })?;
        }

        Commands::Analyze {
            files,
            aliases,
            config,
            print_plan,
            plan_format,
            class,
        } => {
            cmds::analyze::run(AnalyzeArgs {
                files,
                aliases,
                config,
                print_plan,
                plan_format,
                class,
            })?;
        }
    }

    Ok(())
}
