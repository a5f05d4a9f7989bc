//! Clustering of client browsing profiles.
//!
//! Each input point is one client's profile: a fixed-length vector with one
//! entry per web resource, typically 0/1-valued (did the client request that
//! resource in the observation window). Clustering groups clients with
//! similar request patterns so that a cluster's prototype can stand in as a
//! per-group prediction of what its members will request next.
//!
//! The algorithm is a k-means variant with Bayesian-style prior smoothing;
//! see [`Kmeans`] for the details and [`ClusterStore`] for the state it
//! trains.
//!
//! ## Usage
//!
//! ```rust
//! use prefetch::cluster::{Clustering, Kmeans};
//!
//! let profiles = vec![
//!     vec![1.0, 0.0],
//!     vec![1.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![0.0, 1.0],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(1).fit_predict(&profiles).unwrap();
//! assert_eq!(labels.len(), profiles.len());
//! ```

mod kmeans;
mod store;
mod traits;
mod util;

pub use kmeans::{Kmeans, KmeansFit};
pub use store::ClusterStore;
pub use traits::Clustering;
