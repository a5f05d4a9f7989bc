//! Cluster membership and prototype bookkeeping.
//!
//! [`ClusterStore`] holds the per-cluster state the k-means engine mutates
//! during training: a prototype vector plus the current and previous member
//! sets. It makes no algorithmic decisions of its own.

use std::collections::HashSet;

/// One cluster: a prototype and its current/previous member sets.
#[derive(Debug, Clone, Default)]
struct Cluster {
    /// Prior-smoothed mean of the members. Empty until the first recompute.
    prototype: Vec<f32>,
    /// Members after the most recent reassignment pass.
    current: HashSet<usize>,
    /// Members as they stood before the current pass.
    previous: HashSet<usize>,
}

/// State for a fixed number of clusters over points of one dimensionality.
///
/// Exactly `k` clusters are created up front; `k` never changes. The engine
/// mutates the store while fitting, after which it is read-only (evaluation
/// only inspects members and prototypes).
#[derive(Debug, Clone)]
pub struct ClusterStore {
    clusters: Vec<Cluster>,
    dim: usize,
}

impl ClusterStore {
    pub(crate) fn new(k: usize, dim: usize) -> Self {
        Self {
            clusters: vec![Cluster::default(); k],
            dim,
        }
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.clusters.len()
    }

    /// Dimensionality of the points this store was trained on.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Member indices of cluster `id` after the last reassignment pass.
    pub fn members(&self, id: usize) -> &HashSet<usize> {
        &self.clusters[id].current
    }

    /// Prototype of cluster `id`. Empty before the first recompute.
    pub fn prototype(&self, id: usize) -> &[f32] {
        &self.clusters[id].prototype
    }

    /// The cluster currently holding point `idx`, if any.
    ///
    /// Membership is a disjoint partition, so at most one cluster matches.
    pub fn cluster_of(&self, idx: usize) -> Option<usize> {
        self.clusters.iter().position(|c| c.current.contains(&idx))
    }

    /// Copy `current` into `previous` for cluster `id`.
    ///
    /// A real copy, not an alias: reassignment after the snapshot must leave
    /// `previous` untouched or the convergence check is meaningless.
    pub(crate) fn snapshot(&mut self, id: usize) {
        let c = &mut self.clusters[id];
        c.previous = c.current.clone();
    }

    /// Empty cluster `id`'s current member set ahead of reassignment.
    pub(crate) fn clear_current(&mut self, id: usize) {
        self.clusters[id].current.clear();
    }

    /// Add point `idx` to cluster `id`'s current members.
    pub(crate) fn assign(&mut self, id: usize, idx: usize) {
        self.clusters[id].current.insert(idx);
    }

    /// Prior-smoothed mean of cluster `id`'s current members.
    ///
    /// Sums member rows dimension-wise, adds `2 * prior[h]` (a Bayesian
    /// pseudo-count of 2), then divides every dimension by `member_count + 2`.
    /// A zero-member cluster degenerates to the prior rather than failing:
    /// the smoothing keeps the denominator at 2 or more.
    pub(crate) fn compute_prototype(
        &self,
        id: usize,
        prior: &[f32],
        data: &[Vec<f32>],
    ) -> Vec<f32> {
        let members = &self.clusters[id].current;
        let mut proto = vec![0.0f32; self.dim];
        for &i in members {
            for (p, &v) in proto.iter_mut().zip(data[i].iter()) {
                *p += v;
            }
        }
        let denom = members.len() as f32 + 2.0;
        for (p, &pr) in proto.iter_mut().zip(prior.iter()) {
            *p = (*p + 2.0 * pr) / denom;
        }
        proto
    }

    pub(crate) fn set_prototype(&mut self, id: usize, prototype: Vec<f32>) {
        self.clusters[id].prototype = prototype;
    }

    /// True iff cluster `id`'s current and previous member sets are equal.
    ///
    /// This is the sole convergence signal for training.
    pub(crate) fn membership_unchanged(&self, id: usize) -> bool {
        self.clusters[id].current == self.clusters[id].previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prototype_of_empty_cluster_is_prior() {
        let store = ClusterStore::new(2, 2);
        let prior = vec![0.25, 0.75];
        let data: Vec<Vec<f32>> = vec![];
        let proto = store.compute_prototype(0, &prior, &data);
        // (0 + 2*prior) / (0 + 2) = prior
        assert_eq!(proto, prior);
    }

    #[test]
    fn test_prototype_smoothed_mean() {
        let mut store = ClusterStore::new(1, 2);
        let data = vec![vec![1.0, 0.0], vec![1.0, 0.0]];
        store.assign(0, 0);
        store.assign(0, 1);
        let prior = vec![0.5, 0.5];
        let proto = store.compute_prototype(0, &prior, &data);
        // dim 0: (2 + 2*0.5) / 4 = 0.75; dim 1: (0 + 2*0.5) / 4 = 0.25
        assert_eq!(proto, vec![0.75, 0.25]);
    }

    #[test]
    fn test_membership_unchanged_ignores_insertion_order() {
        let mut store = ClusterStore::new(1, 1);
        store.assign(0, 3);
        store.assign(0, 7);
        store.snapshot(0);
        store.clear_current(0);
        store.assign(0, 7);
        store.assign(0, 3);
        assert!(store.membership_unchanged(0));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = ClusterStore::new(1, 1);
        store.assign(0, 0);
        store.snapshot(0);
        store.clear_current(0);
        store.assign(0, 1);
        // Previous still holds {0}, so the memberships differ.
        assert!(!store.membership_unchanged(0));
    }

    #[test]
    fn test_cluster_of() {
        let mut store = ClusterStore::new(3, 1);
        store.assign(2, 5);
        assert_eq!(store.cluster_of(5), Some(2));
        assert_eq!(store.cluster_of(6), None);
    }
}
