//! CLI tools for taskline.
//!
//! A thin demonstration binary: load one or more YAML documents, build the
//! runtime tree, resolve an entrypoint by dotted path, and run it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use taskline::raw::RawDocument;
use taskline::runtime::Selected;

/// CLI arguments for taskline.
#[derive(Parser, Debug)]
#[command(name = "taskline")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one or more documents and print the resulting tree's shape.
    Build {
        /// YAML documents to merge, in order.
        files: Vec<PathBuf>,
    },
    /// Build, resolve an entrypoint, and run it.
    Run {
        /// YAML documents to merge, in order.
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
        /// Dotted path to the node to run, e.g. `build.compile`.
        path: String,
        /// Caller-supplied inputs, `name=value`, repeatable.
        #[arg(long = "input", value_parser = parse_key_val)]
        inputs: Vec<(String, String)>,
        /// Trailing positional arguments, appended to a Runnable's argv.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        extra_args: Vec<String>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) => Ok((k.to_string(), v.to_string())),
        None => Err(format!("expected `name=value`, got '{s}'")),
    }
}

fn load_documents(files: &[PathBuf]) -> Result<Vec<RawDocument>> {
    files
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading '{}'", path.display()))?;
            let doc: RawDocument = serde_yaml::from_str(&text)
                .with_context(|| format!("parsing '{}'", path.display()))?;
            Ok(doc)
        })
        .collect()
}

/// Parses and executes CLI arguments.
///
/// # Errors
///
/// Returns an error if a document fails to load or parse, the build
/// pipeline rejects the merged tree, the entrypoint cannot be resolved, or
/// execution fails.
pub fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Build { files } => {
            let documents = load_documents(&files)?;
            let root = taskline::build(&documents)?;
            println!("built tree rooted at '{}'", root.name());
        }
        Command::Run {
            files,
            path,
            inputs,
            extra_args,
        } => {
            let documents = load_documents(&files)?;
            let root = taskline::build(&documents)?;
            let segments: Vec<String> = path.split('.').map(str::to_string).collect();
            let selected = taskline::resolve_entrypoint(&root, &segments, &extra_args)?;

            let input_map: HashMap<String, String> = inputs.into_iter().collect();
            let executor = taskline::Executor::new();

            match selected {
                Selected::Runnable { node, argv } => {
                    let code = executor.run_command(node, &argv, &input_map)?;
                    if code != 0 {
                        std::process::exit(code);
                    }
                }
                Selected::Pipeline(pipeline) => {
                    let cancel = AtomicBool::new(false);
                    let run = executor.run_pipeline(pipeline, &input_map, &cancel)?;
                    tracing::info!(run_id = %run.run_id, steps = run.steps.len(), "pipeline finished");
                }
            }
        }
    }

    Ok(())
}
