//! Rating statistics.
//!
//! - Histogram ingestion and the mean / Bayesian / slanted estimators
//! - Classification labels with tunable thresholds
//! - The incomplete-beta machinery behind the Bayesian estimate

pub mod beta;
pub mod classify;
pub mod histogram;

pub use classify::{Classification, RatingClassifier};
pub use histogram::{RatingHistogram, BUCKETS, IRONIC_MIN_COUNT};
