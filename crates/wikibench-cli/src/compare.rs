//! The `compare` subcommand: paired significance testing of two runs.
//!
//! Both runs are scored per query against the same qrels; for each metric
//! the queries present in both runs form the paired sample for a t-test.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use wikibench_core::evaluation::{evaluate_per_query, paired_ttest};
use wikibench_core::{trec, DEFAULT_CUTOFFS};

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// TREC qrel file
    #[arg(long)]
    qrels: PathBuf,

    /// Baseline run file (system A)
    #[arg(long)]
    run_a: PathBuf,

    /// Contender run file (system B)
    #[arg(long)]
    run_b: PathBuf,

    /// Rank cutoffs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    cutoffs: Option<Vec<usize>>,

    /// Significance level for the marker column
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,
}

pub fn run(args: CompareArgs) -> Result<()> {
    let qrels = trec::read_qrels(&args.qrels)
        .with_context(|| format!("reading qrels {}", args.qrels.display()))?;
    let run_a = trec::read_run(&args.run_a)
        .with_context(|| format!("reading run {}", args.run_a.display()))?;
    let run_b = trec::read_run(&args.run_b)
        .with_context(|| format!("reading run {}", args.run_b.display()))?;

    let cutoffs = args.cutoffs.as_deref().unwrap_or(DEFAULT_CUTOFFS);
    let table_a = evaluate_per_query(&run_a, &qrels, cutoffs);
    let table_b = evaluate_per_query(&run_b, &qrels, cutoffs);

    // Paired sample: queries evaluated in both systems, in id order.
    let shared: Vec<_> = table_a
        .keys()
        .filter(|q| table_b.contains_key(*q))
        .copied()
        .collect();
    if shared.is_empty() {
        bail!("runs share no evaluated queries");
    }

    let metric_names: Vec<String> = table_a[&shared[0]].keys().cloned().collect();

    println!(
        "{:<14} {:>10} {:>10} {:>9} {:>9}  ({} shared queries)",
        "metric", "A", "B", "t", "p", shared.len()
    );
    for name in &metric_names {
        let scores_a: Vec<f64> = shared.iter().map(|q| table_a[q][name]).collect();
        let scores_b: Vec<f64> = shared.iter().map(|q| table_b[q][name]).collect();

        let mean_a = scores_a.iter().sum::<f64>() / scores_a.len() as f64;
        let mean_b = scores_b.iter().sum::<f64>() / scores_b.len() as f64;
        let test = paired_ttest(&scores_a, &scores_b);
        let marker = if test.is_significant(args.alpha) {
            "*"
        } else {
            ""
        };

        println!(
            "{:<14} {:>10.4} {:>10.4} {:>9.3} {:>9.4}{}",
            name, mean_a, mean_b, test.t_statistic, test.p_value, marker
        );
    }

    Ok(())
}
