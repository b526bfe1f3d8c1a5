//! Browsing the films a user has rated.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::pipeline::paginate::Paginator;
use crate::traits::client::CatalogClient;
use crate::traits::source::FilmPages;
use crate::types::config::{CollectRequest, RATED_PAGE_SIZE};
use crate::types::record::{FilmId, Keyed};

lazy_static! {
    // `1975` or `1970s`
    static ref YEAR_OR_DECADE: Regex = Regex::new(r"^(\d{4})(s?)$").unwrap();
}

/// Sort orders accepted on rated-film views.
pub const RATED_SORT_ORDERS: [&str; 12] = [
    "name",
    "popular",
    "date-earliest",
    "date-latest",
    "rating",
    "rating-lowest",
    "your-rating",
    "your-rating-lowest",
    "entry-rating",
    "entry-rating-lowest",
    "shortest",
    "longest",
];

/// Default cap on films returned by a rated query.
pub const DEFAULT_RATED_LIMIT: usize = 1000;

/// What to select from a user's rated films.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedQuery {
    pub rated_only: bool,
    /// `"1975"` or decade form `"1970s"`
    pub year: Option<String>,
    pub genre: Option<String>,
    pub service: Option<String>,
    /// Stars, 0.5 to 5.0 in half steps
    pub rating: Option<f64>,
    pub sort_by: Option<String>,
    /// `type-category` filter tokens
    pub filters: Vec<String>,
    pub limit: usize,
}

impl Default for RatedQuery {
    fn default() -> Self {
        Self {
            rated_only: false,
            year: None,
            genre: None,
            service: None,
            rating: None,
            sort_by: None,
            filters: Vec::new(),
            limit: DEFAULT_RATED_LIMIT,
        }
    }
}

impl RatedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rated_only(mut self) -> Self {
        self.rated_only = true;
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn rating(mut self, stars: f64) -> Self {
        self.rating = Some(stars);
        self
    }

    pub fn sort_by(mut self, sort: impl Into<String>) -> Self {
        self.sort_by = Some(sort.into());
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Films picked from a user's ratings, with what is needed to credit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedSelection {
    pub username: String,
    pub display_name: String,
    /// Resource path of the rated view the films came from
    pub path: String,
    pub film_ids: Vec<FilmId>,
}

/// A user's rated films.
pub struct UserRated<'a> {
    client: &'a dyn CatalogClient,
    username: String,
}

impl<'a> UserRated<'a> {
    pub fn new(client: &'a dyn CatalogClient, username: impl Into<String>) -> Self {
        Self {
            client,
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Validate `query` and build the resource path of the rated view.
    pub fn path(&self, query: &RatedQuery) -> Result<String> {
        let options = self.client.search_options();
        let mut path = format!("{}/films/ratings/", self.username);

        if query.rated_only {
            path.push_str("rating/");
        }
        if let Some(stars) = query.rating {
            path.push_str(&format!("rated/{}/", encode_rating(stars)?));
        }
        if let Some(year) = &query.year {
            let captures = YEAR_OR_DECADE.captures(year).ok_or_else(|| {
                CatalogError::invalid("year", format!("`{}` is neither 1975 nor 1970s", year))
            })?;
            let value: i32 = captures[1]
                .parse()
                .map_err(|_| CatalogError::invalid("year", format!("`{}` is not a year", year)))?;
            if captures[2].is_empty() {
                if !options.contains_year(value) {
                    return Err(CatalogError::invalid("year", format!("{} is out of range", value)));
                }
                path.push_str(&format!("year/{}/", value));
            } else {
                if !options.contains_decade(value) {
                    return Err(CatalogError::invalid(
                        "year",
                        format!("`{}` is not a valid decade", year),
                    ));
                }
                path.push_str(&format!("decade/{}s/", value));
            }
        }
        if let Some(genre) = &query.genre {
            let genre = genre.to_lowercase();
            if !options.has_genre(&genre) {
                return Err(CatalogError::invalid("genre", format!("unknown genre `{}`", genre)));
            }
            path.push_str(&format!("genre/{}/", genre));
        }
        if let Some(service) = &query.service {
            let service = service.to_lowercase();
            if !options.has_service(&service) {
                return Err(CatalogError::invalid(
                    "service",
                    format!("unknown service `{}`", service),
                ));
            }
            path.push_str(&format!("service/{}/", service));
        }
        if let Some(sort) = &query.sort_by {
            let sort = sort.to_lowercase();
            if !RATED_SORT_ORDERS.contains(&sort.as_str()) {
                return Err(CatalogError::invalid(
                    "sort_by",
                    format!("unknown sort order `{}`", sort),
                ));
            }
            path.push_str(&format!("by/{}/", sort));
        }
        Ok(path)
    }

    /// Run `query` and collect up to `query.limit` film ids.
    pub async fn select(&self, paginator: &Paginator, query: &RatedQuery) -> Result<RatedSelection> {
        if query.limit == 0 {
            return Err(CatalogError::invalid("limit", "must be at least 1"));
        }
        let path = self.path(query)?;
        let filters = self.client.search_options().encode_filters(&query.filters)?;
        let display_name = self.client.resolve_display_name(&self.username).await?;

        let pages = FilmPages::new(self.client, path.clone())
            .with_filters(filters)
            .with_page_size(RATED_PAGE_SIZE);
        let films = paginator
            .collect(&pages, &CollectRequest::all().with_item_limit(query.limit))
            .await?;

        info!(username = %self.username, path = %path, films = films.len(), "Collected rated films");
        Ok(RatedSelection {
            username: self.username.clone(),
            display_name,
            path,
            film_ids: films.iter().map(Keyed::key).collect(),
        })
    }
}

/// Path form of a star rating: `4`, `3%C2%BD`, `%C2%BD`.
pub fn encode_rating(stars: f64) -> Result<String> {
    let halves = stars * 2.0;
    if halves.fract() != 0.0 || !(1.0..=10.0).contains(&halves) {
        return Err(CatalogError::invalid(
            "rating",
            format!("{} is not a half-star rating between 0.5 and 5", stars),
        ));
    }
    let halves = halves as u32;
    let whole = halves / 2;
    Ok(match (whole, halves % 2) {
        (0, _) => "%C2%BD".to_string(),
        (w, 1) => format!("{}%C2%BD", w),
        (w, _) => w.to_string(),
    })
}
