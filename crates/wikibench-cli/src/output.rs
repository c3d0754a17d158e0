//! Report formatting shared by the subcommands.

use wikibench_core::MetricReport;

/// Prints a metric report as an aligned two-column table.
pub fn print_report(report: &MetricReport) {
    for (name, value) in report.iter() {
        println!("{name:<14} {value:.4}");
    }
    println!("({} queries evaluated)", report.query_count());
}
