//! Threshold-based labels over a [`RatingHistogram`].

use serde::{Deserialize, Serialize};

use crate::stats::histogram::RatingHistogram;
use crate::types::config::RatingConfig;

/// Every label and estimate for one histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub total: u64,
    pub mean: f64,
    pub bayesian: f64,
    pub slanted: f64,
    pub bad: bool,
    pub good: bool,
    pub hated: bool,
    pub ironic: bool,
}

/// Applies a [`RatingConfig`] to histograms.
#[derive(Debug, Clone, Default)]
pub struct RatingClassifier {
    config: RatingConfig,
}

impl RatingClassifier {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn bayesian(&self, histogram: &RatingHistogram) -> f64 {
        histogram.bayesian_estimate(self.config.prior_strength, self.config.bayesian_fallback)
    }

    pub fn slanted(&self, histogram: &RatingHistogram) -> f64 {
        histogram.slanted_mean(self.config.slanted_fallback, self.config.slanted_min_count)
    }

    /// Enough ratings, a low Bayesian estimate, and half a star strictly the
    /// most common rating.
    pub fn is_bad(&self, histogram: &RatingHistogram) -> bool {
        histogram.total(None) >= self.config.classify_min_count
            && self.bayesian(histogram) < self.config.bad_bayesian_cutoff
            && histogram.is_strict_mode(1)
    }

    /// Enough ratings and a slanted mean at or above the good threshold.
    pub fn is_good(&self, histogram: &RatingHistogram) -> bool {
        histogram.total(None) >= self.config.classify_min_count
            && self.slanted(histogram) >= self.config.good_threshold
    }

    pub fn is_hated(&self, histogram: &RatingHistogram) -> bool {
        histogram.is_hated(self.config.hated_min_count)
    }

    pub fn is_ironic(&self, histogram: &RatingHistogram) -> bool {
        histogram.is_ironic_above(self.config.ironic_min_count)
    }

    pub fn classify(&self, histogram: &RatingHistogram) -> Classification {
        Classification {
            total: histogram.total(None),
            mean: histogram.arithmetic_mean(),
            bayesian: self.bayesian(histogram),
            slanted: self.slanted(histogram),
            bad: self.is_bad(histogram),
            good: self.is_good(histogram),
            hated: self.is_hated(histogram),
            ironic: self.is_ironic(histogram),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(buckets: [u64; 10]) -> RatingHistogram {
        RatingHistogram::from_buckets(&buckets).unwrap()
    }

    #[test]
    fn test_bad_needs_dominant_half_star() {
        let classifier = RatingClassifier::default();

        // bayesian ~0.97
        assert!(classifier.is_bad(&hist([20, 0, 0, 0, 0, 0, 0, 0, 0, 0])));
        // bayesian ~0.85
        assert!(classifier.is_bad(&hist([30, 5, 0, 0, 0, 0, 0, 0, 0, 0])));
        // low estimate but one star ties half a star
        assert!(!classifier.is_bad(&hist([10, 10, 0, 0, 0, 0, 0, 0, 0, 0])));
        // too few ratings
        assert!(!classifier.is_bad(&hist([4, 0, 0, 0, 0, 0, 0, 0, 0, 0])));
    }

    #[test]
    fn test_bad_respects_cutoff() {
        let h = hist([12, 3, 2, 1, 0, 0, 0, 0, 0, 0]);
        assert!(RatingClassifier::default().is_bad(&h));
        let strict = RatingClassifier::new(RatingConfig::default().with_bad_cutoff(1.0));
        assert!(!strict.is_bad(&h));
    }

    #[test]
    fn test_good_uses_slanted_mean() {
        let classifier = RatingClassifier::default();
        assert!(classifier.is_good(&hist([0, 0, 0, 0, 0, 0, 2, 5, 5, 3])));
        assert!(!classifier.is_good(&hist([1, 2, 3, 4, 5, 6, 7, 8, 9, 10])));
        assert!(!classifier.is_good(&hist([0, 0, 0, 0, 0, 0, 0, 0, 0, 4])));

        let lenient = RatingClassifier::new(RatingConfig::default().with_good_threshold(3.0));
        assert!(lenient.is_good(&hist([1, 2, 3, 4, 5, 6, 7, 8, 9, 10])));
    }

    #[test]
    fn test_ironic_threshold_is_configurable() {
        let h = hist([3, 0, 0, 0, 0, 0, 0, 0, 0, 3]);
        assert!(!RatingClassifier::default().is_ironic(&h));

        let lenient = RatingClassifier::new(RatingConfig {
            ironic_min_count: 4,
            ..RatingConfig::default()
        });
        assert!(lenient.is_ironic(&h));
        assert!(lenient.classify(&h).ironic);
    }

    #[test]
    fn test_classify_collects_everything() {
        let classifier = RatingClassifier::default();
        let c = classifier.classify(&hist([20, 0, 0, 0, 0, 0, 0, 0, 0, 20]));
        assert_eq!(c.total, 40);
        assert!(c.ironic);
        assert!(c.hated);
        assert!(!c.bad);
        assert!(!c.good);
        assert!((c.bayesian - 1.698_691_821_8).abs() < 1e-6);
        assert!((c.mean - 2.75).abs() < 1e-12);
    }

    #[test]
    fn test_empty_histogram_uses_fallbacks() {
        let c = RatingClassifier::default().classify(&RatingHistogram::default());
        assert_eq!(c.bayesian, 2.75);
        assert_eq!(c.slanted, 2.75);
        assert!(!c.bad && !c.good && !c.hated && !c.ironic);
    }
}
