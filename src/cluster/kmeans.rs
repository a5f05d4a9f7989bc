//! Prior-smoothed k-means over client profile vectors.
//!
//! # The Algorithm
//!
//! A Lloyd-style iteration specialized for sparse 0/1 browsing profiles:
//!
//! 1. Assign every point to one of `k` clusters uniformly at random.
//! 2. For each cluster, snapshot its membership, recompute its prototype,
//!    and clear its members.
//! 3. Reassign every point to the cluster with the nearest prototype
//!    (Euclidean distance; ties go to the lowest cluster index).
//! 4. Repeat from 2 until no cluster's membership changed, or the iteration
//!    cap is reached.
//!
//! ## Prior smoothing
//!
//! Prototypes are not plain means. A global prior vector is computed once
//! from the whole training set:
//!
//! ```text
//! prior[h] = (1 + Σ_i data[i][h]) / (n + 2)
//! ```
//!
//! and blended into every prototype with a pseudo-count of 2 (see
//! [`ClusterStore`]). This keeps empty clusters well-defined (they fall back
//! to the prior) and pulls prototypes of tiny clusters toward the global
//! request frequencies, which matters when prototypes are later thresholded
//! for prefetch prediction.
//!
//! ## Convergence
//!
//! Membership stability is the sole convergence signal: the fit is done when
//! every cluster's member set after a reassignment pass equals its member set
//! before the pass. Pathological data can oscillate, so the loop is bounded
//! by `max_iter`; a fit that runs out of iterations is still returned, with
//! [`KmeansFit::converged`] reporting `false`.
//!
//! Uniform-random initialization can leave clusters empty when `k` or `n` is
//! small. That is accepted behavior, not an error: empty clusters simply
//! carry the prior as their prototype.

use rand::prelude::*;
use tracing::{debug, warn};

use super::store::ClusterStore;
use super::traits::Clustering;
use super::util::{check_dims, squared_euclidean};
use crate::error::{Error, Result};

/// Prior-smoothed k-means clustering.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Iteration cap for the reassignment loop.
    max_iter: usize,
    /// Optional RNG seed for reproducible initialization.
    seed: Option<u64>,
}

impl Kmeans {
    /// Create a new k-means model with `k` clusters.
    ///
    /// Defaults: `max_iter = 100`, unseeded RNG.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            seed: None,
        }
    }

    /// Configure a deterministic seed for the random initial partition.
    ///
    /// With a fixed seed, repeated `fit` calls on the same data produce
    /// identical results.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the maximum number of reassignment passes.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Run the clustering to a fixed point (or to the iteration cap).
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyInput`] for an empty training set.
    /// - [`Error::InvalidParameter`] for `k = 0` or `max_iter = 0`.
    /// - [`Error::InvalidClusterCount`] when `k > n`.
    /// - [`Error::DimensionMismatch`] when rows disagree on length.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        let n = data.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        let dim = check_dims(data)?;

        let mut store = ClusterStore::new(self.k, dim);

        // Initial partition: every point to a uniformly random cluster.
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        for i in 0..n {
            store.assign(rng.random_range(0..self.k), i);
        }

        let prior = compute_prior(data, dim);

        let mut converged = false;
        let mut iterations = 0;
        while iterations < self.max_iter {
            iterations += 1;

            // Snapshot memberships and refresh prototypes, then empty the
            // clusters for reassignment. The snapshot must happen before the
            // clear or there is nothing left to compare against.
            for j in 0..self.k {
                store.snapshot(j);
                let proto = store.compute_prototype(j, &prior, data);
                store.set_prototype(j, proto);
                store.clear_current(j);
            }

            for (i, point) in data.iter().enumerate() {
                store.assign(nearest_cluster(&store, point), i);
            }

            let stable = (0..self.k).all(|j| store.membership_unchanged(j));
            debug!(iteration = iterations, stable, "reassignment pass done");
            if stable {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iter = self.max_iter,
                "membership still changing at iteration cap"
            );
        }

        let mut labels = vec![0usize; n];
        for j in 0..self.k {
            for &i in store.members(j) {
                labels[i] = j;
            }
        }

        Ok(KmeansFit {
            store,
            prior,
            labels,
            iterations,
            converged,
        })
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

/// Index of the cluster whose prototype is nearest to `point`.
///
/// Strict `<` comparison, so ties resolve to the lowest cluster index.
fn nearest_cluster(store: &ClusterStore, point: &[f32]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for j in 0..store.k() {
        let dist = squared_euclidean(point, store.prototype(j)).sqrt();
        if dist < best_dist {
            best_dist = dist;
            best = j;
        }
    }
    best
}

/// Global smoothing prior: `prior[h] = (1 + Σ_i data[i][h]) / (n + 2)`.
fn compute_prior(data: &[Vec<f32>], dim: usize) -> Vec<f32> {
    let mut prior = vec![1.0f32; dim];
    for row in data {
        for (p, &v) in prior.iter_mut().zip(row.iter()) {
            *p += v;
        }
    }
    let denom = data.len() as f32 + 2.0;
    for p in &mut prior {
        *p /= denom;
    }
    prior
}

/// Result of a k-means fit: the trained store plus run metadata.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    store: ClusterStore,
    prior: Vec<f32>,
    labels: Vec<usize>,
    iterations: usize,
    converged: bool,
}

impl KmeansFit {
    /// The trained cluster store (read-only from here on).
    pub fn store(&self) -> &ClusterStore {
        &self.store
    }

    /// The global smoothing prior used for every prototype.
    pub fn prior(&self) -> &[f32] {
        &self.prior
    }

    /// One cluster label per training point, in input order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of reassignment passes executed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether membership stabilized before the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The two-pattern dataset from the prefetch scenario: two clients that
    /// only request page 0 and two that only request page 1.
    fn two_patterns() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        ]
    }

    /// Fit `two_patterns` with k=2, scanning seeds until the fit separates
    /// the two patterns. Uniform-random initialization can start from an
    /// uninformative partition (all points in one cluster, or both patterns
    /// split evenly), in which case both prototypes collapse to the prior;
    /// roughly 10 of 16 initial partitions avoid that, so a short seed scan
    /// always finds one.
    fn fit_two_patterns_separated() -> KmeansFit {
        let data = two_patterns();
        for seed in 0..64 {
            let fit = Kmeans::new(2).with_seed(seed).fit(&data).unwrap();
            let l = fit.labels();
            if l[0] == l[1] && l[2] == l[3] && l[0] != l[2] {
                return fit;
            }
        }
        panic!("no seed in 0..64 separated the two patterns");
    }

    #[test]
    fn test_empty_input() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(Kmeans::new(2).fit(&data).is_err());
    }

    #[test]
    fn test_zero_k() {
        let data = two_patterns();
        assert!(Kmeans::new(0).fit(&data).is_err());
    }

    #[test]
    fn test_k_larger_than_n() {
        let data = two_patterns();
        let err = Kmeans::new(5).fit(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidClusterCount { requested: 5, n_items: 4 }));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = vec![vec![1.0, 0.0], vec![1.0]];
        let err = Kmeans::new(1).fit(&data).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, found: 1 }));
    }

    #[test]
    fn test_prior_values() {
        // prior[h] = (1 + column sum) / (n + 2); both columns sum to 2 here.
        let prior = compute_prior(&two_patterns(), 2);
        assert_eq!(prior, vec![0.5, 0.5]);
    }

    #[test]
    fn test_labels_cover_every_point() {
        let data = two_patterns();
        let fit = Kmeans::new(2).with_seed(7).fit(&data).unwrap();
        assert_eq!(fit.labels().len(), data.len());
        for &l in fit.labels() {
            assert!(l < 2);
        }
        // Partition totality: every index in exactly one cluster.
        let mut seen = vec![0usize; data.len()];
        for j in 0..fit.store().k() {
            for &i in fit.store().members(j) {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_two_pattern_scenario() {
        let fit = fit_two_patterns_separated();
        assert!(fit.converged());

        // With members {0,1} (pattern [1,0]) and prior [0.5, 0.5]:
        // prototype = (2 + 2*0.5) / 4 = 0.75 on the requested page,
        // (0 + 2*0.5) / 4 = 0.25 on the other.
        let c0 = fit.labels()[0];
        let c1 = fit.labels()[2];
        assert_eq!(fit.store().prototype(c0), &[0.75, 0.25]);
        assert_eq!(fit.store().prototype(c1), &[0.25, 0.75]);
        assert_eq!(fit.store().members(c0).len(), 2);
        assert_eq!(fit.store().members(c1).len(), 2);
    }

    #[test]
    fn test_converged_fit_is_a_fixed_point() {
        let data = two_patterns();
        let fit = fit_two_patterns_separated();

        // One more hand-run reassignment pass from the converged prototypes
        // must reproduce the identical partition.
        let mut store = fit.store().clone();
        let prior = fit.prior().to_vec();
        for j in 0..store.k() {
            store.snapshot(j);
            let proto = store.compute_prototype(j, &prior, &data);
            store.set_prototype(j, proto);
            store.clear_current(j);
        }
        for (i, point) in data.iter().enumerate() {
            store.assign(nearest_cluster(&store, point), i);
        }
        for j in 0..store.k() {
            assert!(store.membership_unchanged(j));
        }
    }

    #[test]
    fn test_deterministic_given_seed() {
        let data = two_patterns();
        let a = Kmeans::new(2).with_seed(42).fit(&data).unwrap();
        let b = Kmeans::new(2).with_seed(42).fit(&data).unwrap();
        assert_eq!(a.labels(), b.labels());
        for j in 0..2 {
            assert_eq!(a.store().prototype(j), b.store().prototype(j));
        }
    }

    #[test]
    fn test_iteration_cap_respected() {
        let data = two_patterns();
        let fit = Kmeans::new(2).with_seed(3).with_max_iter(1).fit(&data).unwrap();
        assert_eq!(fit.iterations(), 1);
    }

    #[test]
    fn test_single_cluster_prototype_is_smoothed_mean() {
        let data = two_patterns();
        let fit = Kmeans::new(1).with_seed(0).fit(&data).unwrap();
        assert!(fit.converged());
        // All four points in the only cluster: (2 + 2*0.5) / 6 = 0.5 per dim.
        assert_eq!(fit.store().prototype(0), &[0.5, 0.5]);
        assert_eq!(fit.store().members(0).len(), 4);
    }

    #[test]
    fn test_fit_predict_matches_labels() {
        let data = two_patterns();
        let model = Kmeans::new(2).with_seed(9);
        let fit = model.fit(&data).unwrap();
        let labels = model.fit_predict(&data).unwrap();
        assert_eq!(labels, fit.labels());
        assert_eq!(model.n_clusters(), 2);
    }
}
