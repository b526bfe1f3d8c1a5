//! Browsing the site's film catalogue by sort order, year, genre, country
//! and language.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::pipeline::paginate::Paginator;
use crate::traits::client::CatalogClient;
use crate::traits::source::FilmPages;
use crate::types::config::{CollectRequest, SEARCH_PAGE_SIZE};
use crate::types::record::FilmRecord;
use crate::types::search::SearchOptions;

/// Raw search parameters, validated by [`FilmSearch::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub sort_by: Option<String>,
    pub genre: Option<String>,
    pub decade: Option<i32>,
    pub year: Option<i32>,
    pub country: Option<String>,
    pub language: Option<String>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, sort: impl Into<String>) -> Self {
        self.sort_by = Some(sort.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn decade(mut self, decade: i32) -> Self {
        self.decade = Some(decade);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Which films of a search to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Popularity {
    #[default]
    All,
    /// Films with a site rating
    PopularOnly,
    /// Films too little rated for a site rating
    ObscureOnly,
}

impl Popularity {
    fn keeps(self, record: &FilmRecord) -> bool {
        match self {
            Popularity::All => true,
            Popularity::PopularOnly => !record.obscure,
            Popularity::ObscureOnly => record.obscure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Year(i32),
    Decade(i32),
}

/// A validated catalogue search.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmSearch {
    sort_by: String,
    period: Option<Period>,
    genre: Option<String>,
    country: Option<String>,
    language: Option<String>,
}

impl FilmSearch {
    /// Validate `params` against the session's search vocabulary.
    ///
    /// No request is made; every error is [`CatalogError::InvalidParameter`].
    pub fn new(options: &SearchOptions, params: SearchParams) -> Result<Self> {
        let sort_by = params.sort_by.unwrap_or_else(|| "popular".to_string());
        if !options.has_sort_order(&sort_by) {
            return Err(CatalogError::invalid(
                "sort_by",
                format!("unknown sort order `{}`", sort_by),
            ));
        }

        let period = match (params.year, params.decade) {
            (Some(_), Some(_)) => {
                return Err(CatalogError::invalid(
                    "year",
                    "year and decade cannot be combined",
                ))
            }
            (Some(year), None) if !options.contains_year(year) => {
                return Err(CatalogError::invalid("year", format!("{} is out of range", year)))
            }
            (None, Some(decade)) if !options.contains_decade(decade) => {
                return Err(CatalogError::invalid(
                    "decade",
                    format!("{} is not a decade with films", decade),
                ))
            }
            (Some(year), None) => Some(Period::Year(year)),
            (None, Some(decade)) => Some(Period::Decade(decade)),
            (None, None) => None,
        };

        let genre = params
            .genre
            .map(|g| g.to_lowercase().replace(' ', "-"))
            .map(|g| {
                if options.has_genre(&g) {
                    Ok(g)
                } else {
                    Err(CatalogError::invalid("genre", format!("unknown genre `{}`", g)))
                }
            })
            .transpose()?;

        let country = params
            .country
            .map(|c| c.to_lowercase())
            .map(|c| {
                if options.has_country(&c) {
                    Ok(c)
                } else {
                    Err(CatalogError::invalid("country", format!("unknown country `{}`", c)))
                }
            })
            .transpose()?;

        let language = params
            .language
            .map(|l| l.to_lowercase())
            .map(|l| {
                if options.has_language(&l) {
                    Ok(l)
                } else {
                    Err(CatalogError::invalid("language", format!("unknown language `{}`", l)))
                }
            })
            .transpose()?;

        Ok(Self {
            sort_by,
            period,
            genre,
            country,
            language,
        })
    }

    /// Resource path of the search listing.
    pub fn path(&self) -> String {
        let mut path = format!("films/ajax/{}/", self.sort_by);
        match self.period {
            Some(Period::Year(year)) => path.push_str(&format!("year/{}/", year)),
            Some(Period::Decade(decade)) => path.push_str(&format!("decade/{}s/", decade)),
            None => {}
        }
        if let Some(genre) = &self.genre {
            path.push_str(&format!("genre/{}/", genre));
        }
        if let Some(country) = &self.country {
            path.push_str(&format!("country/{}/", country));
        }
        if let Some(language) = &self.language {
            path.push_str(&format!("language/{}/", language));
        }
        path.push_str("size/small/");
        path
    }

    /// The search listing as a page source.
    pub fn pages<'a>(&self, client: &'a dyn CatalogClient) -> FilmPages<'a, dyn CatalogClient + 'a> {
        FilmPages::new(client, self.path()).with_page_size(SEARCH_PAGE_SIZE)
    }

    /// Number of result pages.
    pub async fn total_pages(
        &self,
        client: &dyn CatalogClient,
        paginator: &Paginator,
    ) -> Result<u32> {
        paginator.total_pages(&self.pages(client)).await
    }

    /// Films in the requested page window.
    pub async fn collect(
        &self,
        client: &dyn CatalogClient,
        paginator: &Paginator,
        request: &CollectRequest,
    ) -> Result<Vec<FilmRecord>> {
        self.collect_filtered(client, paginator, request, Popularity::All)
            .await
    }

    /// Films in the requested page window, keeping only one popularity class.
    pub async fn collect_filtered(
        &self,
        client: &dyn CatalogClient,
        paginator: &Paginator,
        request: &CollectRequest,
        popularity: Popularity,
    ) -> Result<Vec<FilmRecord>> {
        let mut films = paginator.collect(&self.pages(client), request).await?;
        films.retain(|f| popularity.keeps(f));
        info!(path = %self.path(), films = films.len(), "Film search finished");
        Ok(films)
    }
}
