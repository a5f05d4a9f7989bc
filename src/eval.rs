//! Prefetch evaluation of a trained clustering.
//!
//! A cluster's prototype doubles as a prediction: every dimension whose
//! prototype value exceeds the prefetch threshold is a resource the system
//! would prefetch for that cluster's clients. Evaluation replays a held-out
//! test profile per client against those predictions and scores them with
//! two ratios:
//!
//! - **hitrate** — fraction of actual requests that were prefetched
//!   (`hits / requests`).
//! - **accuracy** — fraction of prefetched resources actually requested
//!   (`hits / prefetches`).
//!
//! Test profiles are index-aligned with the training set: test row `i`
//! describes the same client as training row `i`, and is scored against the
//! prototype of whichever cluster holds index `i` from the last training
//! pass. Nothing is re-clustered.

use std::fmt;

use tracing::debug;

use crate::cluster::KmeansFit;
use crate::error::{Error, Result};

/// Scores a trained fit against held-out test profiles.
#[derive(Debug, Clone)]
pub struct Evaluator {
    /// Prototype values strictly above this count as a predicted request.
    threshold: f32,
}

impl Evaluator {
    /// Create an evaluator with the default prefetch threshold of 0.5.
    pub fn new() -> Self {
        Self { threshold: 0.5 }
    }

    /// Set the prefetch threshold.
    ///
    /// Raising it makes prefetching more conservative: fewer dimensions
    /// count as predicted, which can only shrink `prefetches`.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// The configured prefetch threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Score `test` against the clusters in `fit`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyInput`] for an empty test set.
    /// - [`Error::DimensionMismatch`] when a test row's length differs from
    ///   the trained dimensionality.
    /// - [`Error::UnassignedPoint`] when a test index is not a member of any
    ///   cluster (more test rows than training rows).
    pub fn evaluate(&self, test: &[Vec<f32>], fit: &KmeansFit) -> Result<Evaluation> {
        if test.is_empty() {
            return Err(Error::EmptyInput);
        }
        let store = fit.store();
        let dim = store.dim();

        let mut prefetches = 0u64;
        let mut hits = 0u64;
        let mut requests = 0u64;

        for (i, profile) in test.iter().enumerate() {
            if profile.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    found: profile.len(),
                });
            }
            let cluster = store
                .cluster_of(i)
                .ok_or(Error::UnassignedPoint { index: i })?;
            let proto = store.prototype(cluster);

            for (&value, &p) in profile.iter().zip(proto.iter()) {
                // Profiles are 0/1 flags; an actual request is exactly 1.
                let actual = value == 1.0;
                let predicted = p > self.threshold;
                if predicted {
                    prefetches += 1;
                }
                if actual && predicted {
                    hits += 1;
                }
                if actual {
                    requests += 1;
                }
            }
        }

        debug!(hits, requests, prefetches, "evaluation pass done");
        Ok(Evaluation {
            threshold: self.threshold,
            hits,
            requests,
            prefetches,
        })
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw counters and derived ratios from one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    threshold: f32,
    hits: u64,
    requests: u64,
    prefetches: u64,
}

impl Evaluation {
    /// Dimensions that were both requested and prefetched.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Dimensions the test profiles actually requested.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Dimensions the prototypes predicted (prefetched).
    pub fn prefetches(&self) -> u64 {
        self.prefetches
    }

    /// Threshold this evaluation was scored with.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// `hits / requests`, or `None` when the test set contains no requests.
    pub fn hitrate(&self) -> Option<f64> {
        (self.requests > 0).then(|| self.hits as f64 / self.requests as f64)
    }

    /// `hits / prefetches`, or `None` when nothing crossed the threshold.
    pub fn accuracy(&self) -> Option<f64> {
        (self.prefetches > 0).then(|| self.hits as f64 / self.prefetches as f64)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn ratio(r: Option<f64>) -> String {
            match r {
                Some(v) => format!("{v:.4}"),
                None => "undefined".to_string(),
            }
        }
        write!(
            f,
            "threshold={} hitrate={} accuracy={}",
            self.threshold,
            ratio(self.hitrate()),
            ratio(self.accuracy())
        )
    }
}
