//! Configuration types for collection, rating statistics and master lists.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CatalogError, Result};

lazy_static! {
    static ref DEFAULT_SITE_URL: Url = Url::parse("https://letterboxd.com/").unwrap();
}

/// Films per page on search listings.
pub const SEARCH_PAGE_SIZE: u32 = 72;

/// Entries per page on list views.
pub const LIST_PAGE_SIZE: u32 = 100;

/// Members per page on followers/following/blocked views.
pub const MEMBER_PAGE_SIZE: u32 = 25;

/// Films per page when browsing a user's rated films.
pub const RATED_PAGE_SIZE: u32 = 18;

/// Tuning for the paginated collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Pages requested per batch before results are folded into the output.
    ///
    /// Default: 25.
    pub batch_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { batch_size: 25 }
    }
}

impl PaginationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size (clamped to at least one page).
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Parameters of one collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectRequest {
    /// First page to collect (1-based)
    pub start_page: u32,

    /// Maximum number of pages to collect from `start_page`
    pub page_limit: Option<u32>,

    /// Share of the available pages that may be visited (0 < cap <= 100)
    pub percent_cap: f64,

    /// Maximum number of records returned; the tail of the last page is cut
    pub item_limit: Option<usize>,
}

impl Default for CollectRequest {
    fn default() -> Self {
        Self {
            start_page: 1,
            page_limit: None,
            percent_cap: 100.0,
            item_limit: None,
        }
    }
}

impl CollectRequest {
    /// Collect everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn starting_at(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    pub fn with_page_limit(mut self, pages: u32) -> Self {
        self.page_limit = Some(pages);
        self
    }

    pub fn with_percent_cap(mut self, percent: f64) -> Self {
        self.percent_cap = percent;
        self
    }

    pub fn with_item_limit(mut self, items: usize) -> Self {
        self.item_limit = Some(items);
        self
    }

    /// Reject out-of-range parameters before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.start_page == 0 {
            return Err(CatalogError::invalid("start_page", "pages are numbered from 1"));
        }
        if self.page_limit == Some(0) {
            return Err(CatalogError::invalid("page_limit", "must be at least 1"));
        }
        if !(self.percent_cap > 0.0 && self.percent_cap <= 100.0) {
            return Err(CatalogError::invalid(
                "percent_cap",
                format!("{} is outside (0, 100]", self.percent_cap),
            ));
        }
        if self.item_limit == Some(0) {
            return Err(CatalogError::invalid("item_limit", "must be at least 1"));
        }
        Ok(())
    }
}

/// Constants behind the rating estimators and classifiers.
///
/// The bad/good cutoffs have moved between releases of the site tooling, so
/// they are configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Pseudo-count added to both sides of the Beta posterior
    pub prior_strength: f64,

    /// Bayesian estimate returned for an empty histogram
    pub bayesian_fallback: f64,

    /// Slanted mean returned when there are too few ratings
    pub slanted_fallback: f64,

    /// Minimum ratings before the slanted mean is trusted
    pub slanted_min_count: u64,

    /// Bayesian estimate strictly below which a film can be bad
    pub bad_bayesian_cutoff: f64,

    /// Slanted mean (stars) at or above which a film is good
    pub good_threshold: f64,

    /// Minimum ratings before bad/good are decided
    pub classify_min_count: u64,

    /// Minimum ratings before the ironic signal is considered
    pub ironic_min_count: u64,

    /// Minimum ratings before the hated signal is considered
    pub hated_min_count: u64,

    /// Films with fewer ratings than this have no site average
    pub obscure_threshold: u64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            prior_strength: 9.0,
            bayesian_fallback: 2.75,
            slanted_fallback: 2.75,
            slanted_min_count: 5,
            bad_bayesian_cutoff: 1.6,
            good_threshold: 3.5,
            classify_min_count: 5,
            ironic_min_count: 10,
            hated_min_count: 5,
            obscure_threshold: 30,
        }
    }
}

impl RatingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bad_cutoff(mut self, cutoff: f64) -> Self {
        self.bad_bayesian_cutoff = cutoff;
        self
    }

    pub fn with_good_threshold(mut self, threshold: f64) -> Self {
        self.good_threshold = threshold;
        self
    }

    pub fn with_classify_min_count(mut self, count: u64) -> Self {
        self.classify_min_count = count;
        self
    }

    pub fn with_prior_strength(mut self, strength: f64) -> Self {
        self.prior_strength = strength;
        self
    }
}

/// Settings for generated list descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterListConfig {
    /// Marker between user-written text and the generated block
    pub separator: String,

    /// Most films listed under each of "Last Added" / "Last Removed"
    pub change_cap: usize,

    /// Site root used for links in the generated block
    pub site_url: Url,
}

impl Default for MasterListConfig {
    fn default() -> Self {
        Self {
            separator: "=".repeat(15),
            change_cap: 25,
            site_url: DEFAULT_SITE_URL.clone(),
        }
    }
}

impl MasterListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_change_cap(mut self, cap: usize) -> Self {
        self.change_cap = cap;
        self
    }

    pub fn with_site_url(mut self, site_url: Url) -> Self {
        self.site_url = site_url;
        self
    }

    /// Absolute link for a site-relative path.
    pub fn link(&self, path: &str) -> String {
        self.site_url
            .join(path.trim_start_matches('/'))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.site_url, path.trim_start_matches('/')))
    }
}
