//! Statistical comparison of retrieval systems.
//!
//! Two tools: bootstrap confidence intervals for a metric mean, and the
//! paired t-test for comparing two systems evaluated on the same queries.
//!
//! # References
//!
//! - Efron & Tibshirani (1993). "An Introduction to the Bootstrap"
//! - Smucker et al. (2007). "A comparison of statistical significance tests for IR evaluation"

use crate::rng::LcgRng;

/// Result of bootstrap confidence interval computation.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapResult {
    /// Sample mean
    pub mean: f64,
    /// Lower bound of the 95% confidence interval
    pub lower: f64,
    /// Upper bound of the 95% confidence interval
    pub upper: f64,
}

impl BootstrapResult {
    /// Formats the result as "mean [lower, upper]".
    pub fn format(&self, precision: usize) -> String {
        format!(
            "{:.prec$} [{:.prec$}, {:.prec$}]",
            self.mean,
            self.lower,
            self.upper,
            prec = precision
        )
    }
}

/// Computes a bootstrap 95% confidence interval for the mean of `values`
/// (e.g. a metric across queries) using `n_bootstrap` resamples drawn with
/// the seeded generator. Returns NaN bounds for an empty sample.
pub fn bootstrap_ci(values: &[f64], n_bootstrap: usize, seed: u64) -> BootstrapResult {
    if values.is_empty() {
        return BootstrapResult {
            mean: f64::NAN,
            lower: f64::NAN,
            upper: f64::NAN,
        };
    }

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let mut rng = LcgRng::new(seed);

    let mut bootstrap_means = Vec::with_capacity(n_bootstrap);
    for _ in 0..n_bootstrap {
        let mut sum = 0.0;
        for _ in 0..n {
            sum += values[rng.next_usize(n)];
        }
        bootstrap_means.push(sum / n as f64);
    }

    bootstrap_means.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let lower_idx = ((n_bootstrap as f64) * 0.025) as usize;
    let upper_idx = ((n_bootstrap as f64) * 0.975) as usize;

    BootstrapResult {
        mean,
        lower: bootstrap_means[lower_idx.min(bootstrap_means.len() - 1)],
        upper: bootstrap_means[upper_idx.min(bootstrap_means.len() - 1)],
    }
}

/// Result of a paired t-test.
#[derive(Debug, Clone, Copy)]
pub struct TTestResult {
    /// t-statistic (positive if system A > system B)
    pub t_statistic: f64,
    /// Two-tailed p-value
    pub p_value: f64,
    /// Degrees of freedom
    pub df: usize,
}

impl TTestResult {
    /// Returns true if the difference is significant at the given alpha.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Formats the result for display.
    pub fn format(&self) -> String {
        let sig_marker = if self.is_significant(0.05) { "*" } else { "" };
        format!(
            "t({})={:.3}, p={:.4}{}",
            self.df, self.t_statistic, self.p_value, sig_marker
        )
    }
}

/// Performs a paired t-test over per-query scores from two systems.
///
/// Both slices must hold scores for the same queries in the same order.
/// Positive t means system A scored higher on average.
///
/// # Panics
///
/// Panics if the slices differ in length or are empty.
pub fn paired_ttest(system_a: &[f64], system_b: &[f64]) -> TTestResult {
    assert_eq!(
        system_a.len(),
        system_b.len(),
        "Paired t-test requires equal-length arrays"
    );
    assert!(!system_a.is_empty(), "Cannot perform t-test on empty arrays");

    let n = system_a.len();
    let df = n - 1;

    let diffs: Vec<f64> = system_a
        .iter()
        .zip(system_b.iter())
        .map(|(a, b)| a - b)
        .collect();

    let mean_diff = diffs.iter().sum::<f64>() / n as f64;
    let var_diff = diffs.iter().map(|d| (d - mean_diff).powi(2)).sum::<f64>() / df as f64;
    let se = (var_diff / n as f64).sqrt();

    let t = if se > 0.0 { mean_diff / se } else { 0.0 };
    let p_value = t_distribution_p_value(t.abs(), df);

    TTestResult {
        t_statistic: t,
        p_value,
        df,
    }
}

// ============================================================================
// Internal: t-distribution p-value approximation
// ============================================================================

/// Two-tailed p-value from the t-distribution via the incomplete beta
/// relationship p = I_{df/(df+t²)}(df/2, 1/2); normal approximation for
/// large df.
fn t_distribution_p_value(t_abs: f64, df: usize) -> f64 {
    if df > 100 {
        return 2.0 * (1.0 - normal_cdf(t_abs));
    }

    let x = df as f64 / (df as f64 + t_abs * t_abs);
    incomplete_beta(df as f64 / 2.0, 0.5, x)
}

/// Normal CDF using the error function.
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / 2.0_f64.sqrt()))
}

/// Error function approximation (Abramowitz and Stegun).
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

/// Incomplete beta function using a continued fraction.
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    let bt =
        (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        bt * beta_cf(a, b, x) / a
    } else {
        1.0 - bt * beta_cf(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta function.
fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
    let max_iter = 100;
    let eps = 1e-10;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < 1e-30 {
        d = 1e-30;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=max_iter {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < 1e-30 {
            d = 1e-30;
        }
        c = 1.0 + aa / c;
        if c.abs() < 1e-30 {
            c = 1e-30;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < 1e-30 {
            d = 1e-30;
        }
        c = 1.0 + aa / c;
        if c.abs() < 1e-30 {
            c = 1e-30;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < eps {
            break;
        }
    }

    h
}

/// Log gamma via the Lanczos series.
fn ln_gamma(x: f64) -> f64 {
    let coeffs = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];

    let y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();

    let mut ser = 1.000000000190015;
    for (i, &coeff) in coeffs.iter().enumerate() {
        ser += coeff / (y + 1.0 + i as f64);
    }

    -tmp + (2.5066282746310005 * ser / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_ci_basic() {
        let values = vec![0.85, 0.90, 0.88, 0.92, 0.87, 0.89, 0.91, 0.86, 0.88, 0.90];
        let result = bootstrap_ci(&values, 1000, 42);

        assert!((result.mean - 0.886).abs() < 0.01);
        assert!(result.lower <= result.mean);
        assert!(result.upper >= result.mean);

        let width = result.upper - result.lower;
        assert!(width > 0.001 && width < 0.1);
    }

    #[test]
    fn test_bootstrap_ci_reproducible() {
        let values = vec![0.2, 0.5, 0.8, 0.4, 0.6];
        let a = bootstrap_ci(&values, 500, 7);
        let b = bootstrap_ci(&values, 500, 7);

        assert_eq!(a.lower, b.lower);
        assert_eq!(a.upper, b.upper);
    }

    #[test]
    fn test_bootstrap_ci_empty() {
        let result = bootstrap_ci(&[], 100, 42);
        assert!(result.mean.is_nan());
    }

    #[test]
    fn test_paired_ttest_significant() {
        let system_a = vec![0.9, 0.92, 0.88, 0.91, 0.89, 0.93, 0.87, 0.90];
        let system_b = vec![0.7, 0.72, 0.68, 0.71, 0.69, 0.73, 0.67, 0.70];

        let result = paired_ttest(&system_a, &system_b);

        assert!(result.is_significant(0.001));
        assert!(result.t_statistic > 0.0);
    }

    #[test]
    fn test_paired_ttest_not_significant() {
        let system_a = vec![0.85, 0.87, 0.86, 0.84, 0.85];
        let system_b = vec![0.84, 0.86, 0.87, 0.85, 0.86];

        let result = paired_ttest(&system_a, &system_b);
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn test_paired_ttest_identical_systems() {
        let scores = vec![0.5, 0.6, 0.7, 0.8];
        let result = paired_ttest(&scores, &scores);

        assert_eq!(result.t_statistic, 0.0);
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn test_normal_cdf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 0.001);
        assert!((normal_cdf(1.96) - 0.975).abs() < 0.01);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 0.01);
    }
}
