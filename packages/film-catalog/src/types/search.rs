//! Search vocabulary the session loads once at start-up.
//!
//! Validation against these options is local: nothing here touches the
//! network.

use chrono::{Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CatalogError, Result};

lazy_static! {
    // `show-liked`, `hide-docs`, ...
    static ref FILTER_TOKEN: Regex = Regex::new(r"^\w+-\w+$").unwrap();
}

/// Valid values for search, browse and filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub genres: Vec<String>,

    /// Streaming services (may be specific to the session user)
    #[serde(default)]
    pub services: Vec<String>,

    /// Sort orders, e.g. `popular`, `by/release-earliest`
    #[serde(default)]
    pub sort_orders: Vec<String>,

    /// Country slugs
    #[serde(default)]
    pub countries: Vec<String>,

    /// Language slugs
    #[serde(default)]
    pub languages: Vec<String>,

    /// Filter category -> allowed filter types (e.g. `liked` -> [`show`, `hide`])
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,

    /// Years with films, end exclusive
    pub year_range: (i32, i32),
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            services: Vec::new(),
            sort_orders: vec!["popular".to_string()],
            countries: Vec::new(),
            languages: Vec::new(),
            filters: BTreeMap::new(),
            year_range: Self::default_year_range(),
        }
    }
}

impl SearchOptions {
    /// 1860 up to the end of the current decade.
    pub fn default_year_range() -> (i32, i32) {
        let year = Utc::now().year();
        (1860, year - year.rem_euclid(10) + 10)
    }

    pub fn contains_year(&self, year: i32) -> bool {
        (self.year_range.0..self.year_range.1).contains(&year)
    }

    pub fn contains_decade(&self, decade: i32) -> bool {
        decade % 10 == 0 && self.contains_year(decade)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        contains_ci(&self.genres, genre)
    }

    pub fn has_service(&self, service: &str) -> bool {
        contains_ci(&self.services, service)
    }

    pub fn has_sort_order(&self, sort: &str) -> bool {
        self.sort_orders.iter().any(|s| s == sort)
    }

    pub fn has_country(&self, country: &str) -> bool {
        contains_ci(&self.countries, country)
    }

    pub fn has_language(&self, language: &str) -> bool {
        contains_ci(&self.languages, language)
    }

    /// Validate filter tokens and join them into the cookie encoding.
    ///
    /// A token is `type-category` (e.g. `hide-reviewed`); both halves must be
    /// known to the session. An empty slice encodes to `None`.
    pub fn encode_filters<S: AsRef<str>>(&self, filters: &[S]) -> Result<Option<String>> {
        if filters.is_empty() {
            return Ok(None);
        }
        for token in filters {
            let token = token.as_ref();
            if !FILTER_TOKEN.is_match(token) {
                return Err(CatalogError::invalid(
                    "filters",
                    format!("`{}` is not of the form type-category", token),
                ));
            }
            let (kind, category) = token.split_once('-').unwrap_or((token, ""));
            let Some(kinds) = self.filters.get(category) else {
                return Err(CatalogError::invalid(
                    "filters",
                    format!("unknown filter category `{}`", category),
                ));
            };
            if !kinds.iter().any(|k| k == kind) {
                return Err(CatalogError::invalid(
                    "filters",
                    format!("`{}` is not a valid type for category `{}`", kind, category),
                ));
            }
        }
        Ok(Some(
            filters
                .iter()
                .map(|f| f.as_ref())
                .collect::<Vec<_>>()
                .join("%20"),
        ))
    }
}

fn contains_ci(values: &[String], needle: &str) -> bool {
    values.iter().any(|v| v.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> SearchOptions {
        let mut filters = BTreeMap::new();
        filters.insert("liked".to_string(), vec!["show".to_string(), "hide".to_string()]);
        filters.insert("docs".to_string(), vec!["hide".to_string()]);
        SearchOptions {
            genres: vec!["horror".into(), "science-fiction".into()],
            year_range: (1860, 2030),
            filters,
            ..Default::default()
        }
    }

    #[test]
    fn test_year_and_decade_bounds() {
        let opts = options();
        assert!(opts.contains_year(1860));
        assert!(!opts.contains_year(1859));
        assert!(!opts.contains_year(2030));
        assert!(opts.contains_decade(1970));
        assert!(!opts.contains_decade(1975));
    }

    #[test]
    fn test_default_year_range_ends_on_decade() {
        let (start, end) = SearchOptions::default_year_range();
        assert_eq!(start, 1860);
        assert_eq!(end % 10, 0);
        assert!(end > Utc::now().year());
    }

    #[test]
    fn test_encode_filters() {
        let opts = options();
        assert_eq!(opts.encode_filters::<&str>(&[]).unwrap(), None);
        assert_eq!(
            opts.encode_filters(&["show-liked", "hide-docs"]).unwrap().as_deref(),
            Some("show-liked%20hide-docs")
        );
        assert!(opts.encode_filters(&["showliked"]).is_err());
        assert!(opts.encode_filters(&["show-reviewed"]).is_err());
        assert!(opts.encode_filters(&["show-docs"]).is_err());
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert!(options().has_genre("Horror"));
        assert!(!options().has_genre("western"));
    }
}
