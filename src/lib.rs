//! Prior-smoothed k-means for web prefetch prediction.
//!
//! `prefetch` partitions client browsing profiles (fixed-length, typically
//! 0/1-valued vectors with one entry per web resource) into `k` clusters,
//! then uses each cluster's smoothed prototype to predict which resources
//! its clients will request. Prediction quality is scored as hit-rate and
//! accuracy over a held-out, index-aligned test set.
//!
//! The public API is:
//! - [`cluster::Kmeans`] — the clustering engine (random initialization,
//!   Lloyd iterations with Bayesian prior smoothing, bounded convergence).
//! - [`eval::Evaluator`] — prefetch scoring of a trained fit.
//!
//! ```rust
//! use prefetch::{Evaluator, Kmeans};
//!
//! let profiles = vec![
//!     vec![1.0, 0.0],
//!     vec![1.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![0.0, 1.0],
//! ];
//!
//! let fit = Kmeans::new(2).with_seed(1).fit(&profiles).unwrap();
//! let scores = Evaluator::new().evaluate(&profiles, &fit).unwrap();
//! println!("{scores}");
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod eval;

pub use cluster::{ClusterStore, Clustering, Kmeans, KmeansFit};
pub use error::{Error, Result};
pub use eval::{Evaluation, Evaluator};
