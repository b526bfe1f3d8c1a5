//! Details and rating statistics for a single film.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::stats::classify::{Classification, RatingClassifier};
use crate::stats::histogram::RatingHistogram;
use crate::traits::client::CatalogClient;
use crate::types::config::RatingConfig;
use crate::types::film::{FilmDetails, HistogramSubject};

lazy_static! {
    static ref FILM_PATH: Regex = Regex::new(r"(/film/)?([-\w\s:]+)/?").unwrap();
}

/// Characters kept by [`FilmInfo::description_short`].
const SHORT_DESCRIPTION_LEN: usize = 128;

/// Normalize a film path or title into its slug.
///
/// `/film/black-swan/`, `black-swan` and `Black Swan` all give `black-swan`.
pub fn film_slug(input: &str) -> Result<String> {
    let lowered = input.to_lowercase();
    let slug = FILM_PATH
        .captures(&lowered)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().trim().replace(' ', "-").replace("--", "-"))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            CatalogError::invalid("film", format!("no film path in `{}`", input))
        })?;
    Ok(slug)
}

/// A film's page details together with its rating histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmInfo {
    pub slug: String,
    pub details: FilmDetails,
    pub histogram: RatingHistogram,
}

impl FilmInfo {
    /// Fetch details and histogram for a film path or title.
    pub async fn load(client: &dyn CatalogClient, film: &str) -> Result<Self> {
        let slug = film_slug(film)?;
        let details = client.fetch_film(&slug).await?;
        let buckets = client
            .fetch_histogram(&HistogramSubject::Film(slug.clone()))
            .await?;
        let histogram = RatingHistogram::from_buckets(&buckets)?;
        debug!(film = %slug, ratings = histogram.total(None), "Loaded film");
        Ok(Self {
            slug,
            details,
            histogram,
        })
    }

    pub fn path(&self) -> String {
        format!("film/{}/", self.slug)
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    /// Too few ratings for the site to publish an average.
    pub fn is_obscure(&self, config: &RatingConfig) -> bool {
        self.histogram.total(None) < config.obscure_threshold
    }

    /// Site rating when published, otherwise the mean of the histogram.
    pub fn site_rating_or_mean(&self, config: &RatingConfig) -> f64 {
        match self.details.site_rating {
            Some(rating) if !self.is_obscure(config) => rating,
            _ => self.histogram.arithmetic_mean(),
        }
    }

    /// Description cut at the last space before 128 characters, with an ellipsis.
    pub fn description_short(&self) -> String {
        let description = self.details.description.as_deref().unwrap_or_default();
        let chars: Vec<char> = description.chars().collect();
        if chars.len() < SHORT_DESCRIPTION_LEN {
            return description.to_string();
        }
        let cut = chars[..SHORT_DESCRIPTION_LEN]
            .iter()
            .rposition(|c| *c == ' ')
            .filter(|i| *i > 0)
            .unwrap_or(SHORT_DESCRIPTION_LEN);
        format!("{}...", chars[..cut].iter().collect::<String>())
    }

    pub fn classification(&self, classifier: &RatingClassifier) -> Classification {
        classifier.classify(&self.histogram)
    }
}
