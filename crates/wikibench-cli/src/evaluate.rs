//! The `evaluate` subcommand: score a run file against a qrel file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wikibench_core::{evaluate, trec, DEFAULT_CUTOFFS};

use crate::output;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// TREC qrel file
    #[arg(long)]
    qrels: PathBuf,

    /// TREC run file
    #[arg(long)]
    run: PathBuf,

    /// Rank cutoffs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    cutoffs: Option<Vec<usize>>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Also write the report as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub fn run(args: EvaluateArgs) -> Result<()> {
    let qrels = trec::read_qrels(&args.qrels)
        .with_context(|| format!("reading qrels {}", args.qrels.display()))?;
    let results = trec::read_run(&args.run)
        .with_context(|| format!("reading run {}", args.run.display()))?;

    let cutoffs = args.cutoffs.as_deref().unwrap_or(DEFAULT_CUTOFFS);
    let report = evaluate(&results, &qrels, cutoffs);

    if report.is_empty() {
        eprintln!("No queries shared between run and qrels; nothing to report.");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report);
    }

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}
