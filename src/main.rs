use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use monolay::{Preprocessor, TemplatePreprocessor};

#[derive(Parser)]
#[command(name = "monolay")]
#[command(author, version, about = "Template preprocessor for memory layout definition files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess a definition tree into a temporary directory
    Process {
        /// The root definition file
        input: PathBuf,

        /// Dump the result (path maps included) as JSON
        #[arg(long)]
        dump_map: bool,
    },

    /// Report whether a definition tree contains any templates
    Check {
        /// The root definition file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logger before parsing CLI args
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    match cli.command {
        Commands::Process { input, dump_map } => process_command(&input, dump_map),
        Commands::Check { input } => check_command(&input),
    }
}

fn process_command(input: &Path, dump_map: bool) -> Result<()> {
    let preprocessor = TemplatePreprocessor::new();

    let Some(result) = preprocessor.process_tree(input) else {
        println!("{}", "no templates found, nothing to do".yellow());
        return Ok(());
    };

    if dump_map {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to serialize the result")?
        );
        return Ok(());
    }

    for (original, processed) in &result.original_to_processed {
        println!(
            "{} {} {}",
            original.display(),
            "->".dimmed(),
            processed.display()
        );
    }

    println!(
        "{} {}",
        "processed root:".green().bold(),
        result.processed_root.display()
    );

    Ok(())
}

fn check_command(input: &Path) -> Result<()> {
    let preprocessor = TemplatePreprocessor::new();

    match preprocessor.process_tree(input) {
        Some(result) => {
            println!(
                "{} {} file(s) rewritten",
                "templates found:".green().bold(),
                result.original_to_processed.len()
            );
            preprocessor.cleanup(&result);
        }
        None => println!("{}", "no templates found".yellow()),
    }

    Ok(())
}
