use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use skiff_thrift::module_to_json;
use skiff_thrift_compiler::error::ThriftError;
use skiff_thrift_compiler::Loader;

#[derive(Parser)]
#[command(name = "sthrift")]
#[command(about = "Parse Thrift IDL files and inspect the schema model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a `.thrift` file and report whether it is valid
    Check {
        /// Input `.thrift` file
        #[arg(short, long)]
        input: PathBuf,

        /// Base directory for resolving include statements
        #[arg(short = 'I', long)]
        include_dir: Option<PathBuf>,
    },

    /// Parse a `.thrift` file and dump the schema model as JSON
    Dump {
        /// Input `.thrift` file
        #[arg(short, long)]
        input: PathBuf,

        /// Base directory for resolving include statements
        #[arg(short = 'I', long)]
        include_dir: Option<PathBuf>,

        /// Output `.json` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn loader_for(include_dir: &Option<PathBuf>) -> Loader {
    match include_dir {
        Some(dir) => Loader::with_include_dir(dir.clone()),
        None => Loader::new(),
    }
}

fn main() -> Result<(), ThriftError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Check { input, include_dir } => {
            let module = loader_for(include_dir).load(input)?;
            println!("OK: module {} with {} definitions", module.name, module.len());
            Ok(())
        }

        Commands::Dump {
            input,
            include_dir,
            output,
        } => {
            let module = loader_for(include_dir).load(input)?;
            let json = module_to_json(&module);
            if let Some(out_path) = output {
                fs::write(out_path, &json).map_err(ThriftError::Io)?;
                println!("Schema model written to {}", out_path.display());
            } else {
                println!("{}", json);
            }
            Ok(())
        }
    }
}
