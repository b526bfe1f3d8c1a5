//! Rating histogram - ten half-star buckets and the estimators built on them.
//!
//! Bucket `n` (1..=10) holds the number of `n * 0.5` star ratings. Means are
//! reported in stars, so the half-star unit is scaled by 0.5 everywhere.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::stats::beta::inverse_beta_reg;

/// Number of half-star buckets.
pub const BUCKETS: usize = 10;

/// Fewest ratings before the ironic signal is considered.
pub const IRONIC_MIN_COUNT: u64 = 10;

/// Posterior quantile used by the Bayesian estimate.
const POSTERIOR_QUANTILE: f64 = 0.05;

/// Count distribution of ratings for one film or user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingHistogram {
    buckets: [u64; BUCKETS],
}

impl RatingHistogram {
    /// Build from raw bucket counts, lowest score first.
    pub fn from_buckets(counts: &[u64]) -> Result<Self> {
        let buckets: [u64; BUCKETS] = counts
            .try_into()
            .map_err(|_| CatalogError::MalformedHistogram {
                buckets: counts.len(),
            })?;
        Ok(Self { buckets })
    }

    /// Build from `(score, count)` pairs; absent scores count zero.
    pub fn from_scores(scores: impl IntoIterator<Item = (u8, u64)>) -> Result<Self> {
        let mut buckets = [0; BUCKETS];
        for (score, count) in scores {
            if !(1..=BUCKETS as u8).contains(&score) {
                return Err(CatalogError::invalid(
                    "score",
                    format!("{} is outside 1..=10", score),
                ));
            }
            buckets[usize::from(score - 1)] = count;
        }
        Ok(Self { buckets })
    }

    /// Count for one score (1..=10); 0 for anything else.
    pub fn count(&self, score: u8) -> u64 {
        match score {
            1..=10 => self.buckets[usize::from(score - 1)],
            _ => 0,
        }
    }

    pub fn buckets(&self) -> &[u64; BUCKETS] {
        &self.buckets
    }

    /// Sum of all buckets, or one bucket's count when `score` is given.
    pub fn total(&self, score: Option<u8>) -> u64 {
        match score {
            Some(score) => self.count(score),
            None => self.buckets.iter().sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total(None) == 0
    }

    fn scored(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .map(|(i, &c)| ((i + 1) as f64, c as f64))
    }

    /// Σ score × count, in half-star units.
    pub fn weighted_sum(&self) -> f64 {
        self.scored().map(|(n, c)| n * c).sum()
    }

    /// Mean rating in stars; 0 for an empty histogram.
    pub fn arithmetic_mean(&self) -> f64 {
        let total = self.total(None);
        if total == 0 {
            return 0.0;
        }
        self.weighted_sum() / total as f64 * 0.5
    }

    /// Mean rounded to `places` decimals.
    pub fn rounded_mean(&self, places: i32) -> f64 {
        let factor = 10f64.powi(places);
        (self.arithmetic_mean() * factor).round() / factor
    }

    /// Conservative rating estimate: the 5th percentile of a Beta posterior.
    ///
    /// Each rating is split into pseudo up/down votes by its position on the
    /// scale. Top-bucket votes count two thirds towards "up" and bottom-bucket
    /// votes count one and a half towards "down", so a film cannot ride a
    /// single extreme bucket. The quantile is mapped onto 0.5..=5.0 stars.
    pub fn bayesian_estimate(&self, prior_strength: f64, fallback: f64) -> f64 {
        if self.is_empty() {
            return fallback;
        }
        let (up, down) = self.scored().fold((0.0, 0.0), |(up, down), (n, c)| {
            let up_count = if n == 10.0 { c / 1.5 } else { c };
            let down_count = if n == 1.0 { c * 1.5 } else { c };
            (
                up + up_count * (n - 1.0) / 9.0,
                down + down_count * (9.0 - (n - 1.0)) / 9.0,
            )
        });
        inverse_beta_reg(POSTERIOR_QUANTILE, up + prior_strength, down + prior_strength) * 4.5
            + 0.5
    }

    /// Mean in stars after damping troll buckets.
    ///
    /// Half-star and one-star counts are inflated (x1.2, x1.05) and five-star
    /// counts deflated (x0.75). Below `min_count` ratings returns `fallback`.
    pub fn slanted_mean(&self, fallback: f64, min_count: u64) -> f64 {
        let total = self.total(None);
        if total < min_count || total == 0 {
            return fallback;
        }
        let (sum, weight) = self.scored().fold((0.0, 0.0), |(sum, weight), (n, c)| {
            let adjusted = c * match n as u8 {
                1 => 1.2,
                2 => 1.05,
                10 => 0.75,
                _ => 1.0,
            };
            (sum + n * adjusted, weight + adjusted)
        });
        sum / weight * 0.5
    }

    /// Scores ordered by count, most frequent first; ties keep score order.
    pub fn ranked_scores(&self) -> Vec<u8> {
        let mut scores: Vec<u8> = (1..=BUCKETS as u8).collect();
        scores.sort_by(|a, b| self.count(*b).cmp(&self.count(*a)));
        scores
    }

    /// Most frequent score (lowest score on ties), `None` when empty.
    pub fn mode(&self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        self.ranked_scores().first().copied()
    }

    /// Score `score` outnumbers every other bucket.
    pub fn is_strict_mode(&self, score: u8) -> bool {
        let count = self.count(score);
        count > 0
            && (1..=BUCKETS as u8)
                .filter(|s| *s != score)
                .all(|s| self.count(s) < count)
    }

    /// Ratings pile up at both extremes: the two most frequent buckets are
    /// exactly half a star and five stars.
    pub fn is_ironic(&self) -> bool {
        self.is_ironic_above(IRONIC_MIN_COUNT)
    }

    /// [`is_ironic`](Self::is_ironic) with a caller-chosen minimum count.
    pub fn is_ironic_above(&self, min_count: u64) -> bool {
        let total = self.total(None);
        if total == 0 || total < min_count {
            return false;
        }
        let ranked = self.ranked_scores();
        let mut top_two = [ranked[0], ranked[1]];
        top_two.sort_unstable();
        top_two == [1, 10]
    }

    /// The most frequent rating is half a star.
    pub fn is_hated(&self, min_count: u64) -> bool {
        let total = self.total(None);
        total > 0 && total >= min_count && self.mode() == Some(1)
    }
}
