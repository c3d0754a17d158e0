//! Train/validation/test partitioning of judged queries.
//!
//! The judged query ids are shuffled once with the seeded generator and then
//! sliced contiguously. Two policies are supported: proportional fractions
//! of the query count (sliced train, validation, test, with any remainder
//! left unassigned) and fixed cardinalities for validation and test (sliced
//! validation, test, with the remainder becoming train). Either way the
//! three sets are pairwise disjoint and reproducible for a given seed.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::rng::LcgRng;
use crate::types::QueryId;

/// How the judged queries are divided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSpec {
    /// Fractions of the judged-query count, each in [0, 1], summing to at
    /// most 1.0. Sliced in (train, validation, test) order.
    Proportions {
        train: f64,
        validation: f64,
        test: f64,
    },
    /// Exact validation and test sizes; every remaining query goes to train.
    /// Sliced in (validation, test, train) order.
    Counts { validation: usize, test: usize },
}

impl SplitSpec {
    /// Fails fast on slices that would be negative or overlapping, before
    /// any shuffle or file output happens.
    pub fn validate(&self, available: usize) -> Result<(), ConfigError> {
        match *self {
            SplitSpec::Proportions {
                train,
                validation,
                test,
            } => {
                for (name, value) in [
                    ("train", train),
                    ("validation", validation),
                    ("test", test),
                ] {
                    if !(0.0..=1.0).contains(&value) || value.is_nan() {
                        return Err(ConfigError::ProportionOutOfRange { name, value });
                    }
                }
                let sum = train + validation + test;
                if sum > 1.0 {
                    return Err(ConfigError::ProportionsExceedOne(sum));
                }
                Ok(())
            }
            SplitSpec::Counts { validation, test } => {
                let required = validation + test;
                if required > available {
                    return Err(ConfigError::CountsExceedQueries {
                        required,
                        available,
                    });
                }
                Ok(())
            }
        }
    }
}

/// Disjoint query-id partitions produced by [`partition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partitions {
    pub train: Vec<QueryId>,
    pub validation: Vec<QueryId>,
    pub test: Vec<QueryId>,
}

impl Partitions {
    /// (name, ids) pairs for iteration in the conventional order.
    pub fn named(&self) -> [(&'static str, &[QueryId]); 3] {
        [
            ("train", self.train.as_slice()),
            ("validation", self.validation.as_slice()),
            ("test", self.test.as_slice()),
        ]
    }
}

/// Shuffles `query_ids` with the seed and slices them per `spec`.
pub fn partition(
    query_ids: &[QueryId],
    spec: &SplitSpec,
    seed: u64,
) -> Result<Partitions, ConfigError> {
    spec.validate(query_ids.len())?;

    let mut ids = query_ids.to_vec();
    LcgRng::new(seed).shuffle(&mut ids);
    let n = ids.len();

    let partitions = match *spec {
        SplitSpec::Proportions {
            train,
            validation,
            test,
        } => {
            let n_train = (train * n as f64) as usize;
            let n_validation = (validation * n as f64) as usize;
            let n_test = (test * n as f64) as usize;

            let train = ids[..n_train].to_vec();
            let validation = ids[n_train..n_train + n_validation].to_vec();
            let test = ids[n_train + n_validation..n_train + n_validation + n_test].to_vec();
            Partitions {
                train,
                validation,
                test,
            }
        }
        SplitSpec::Counts { validation, test } => {
            let val = ids[..validation].to_vec();
            let tst = ids[validation..validation + test].to_vec();
            let train = ids[validation + test..].to_vec();
            Partitions {
                train,
                validation: val,
                test: tst,
            }
        }
    };

    info!(
        train = partitions.train.len(),
        validation = partitions.validation.len(),
        test = partitions.test.len(),
        "partitioned queries"
    );
    Ok(partitions)
}
