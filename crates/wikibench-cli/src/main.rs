//! wikibench CLI - build and evaluate retrieval benchmark collections.
//!
//! # Usage
//!
//! ```bash
//! # Build a collection from a JSON-lines dump
//! wikibench build --input enwiki.jsonl --output-dir collection/ --bm25
//!
//! # Evaluate a run file against qrels
//! wikibench evaluate --qrels collection/test.qrel --run collection/test.bm25.run
//!
//! # Compare two systems with a paired t-test
//! wikibench compare --qrels test.qrel --run-a bm25.run --run-b neural.run
//! ```

mod build;
mod compare;
mod evaluate;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Build IR benchmark collections from encyclopedic dumps and evaluate
/// ranking models against them.
#[derive(Parser)]
#[command(name = "wikibench", version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a labeled collection (documents, queries, qrels, splits)
    Build(build::BuildArgs),
    /// Score a run file against a qrel file
    Evaluate(evaluate::EvaluateArgs),
    /// Compare two run files with paired significance tests
    Compare(compare::CompareArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Command::Build(args) => build::run(args),
        Command::Evaluate(args) => evaluate::run(args),
        Command::Compare(args) => compare::run(args),
    }
}
