//! Film and profile detail types.

use serde::{Deserialize, Serialize};

use crate::types::record::FilmId;

/// Details from a film's main page.
///
/// Every field the page may omit is typed `Option` or defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmDetails {
    pub id: Option<FilmId>,
    pub name: String,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub director: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    pub runtime_minutes: Option<u32>,
    /// Weighted average the site publishes (only for films with enough ratings)
    pub site_rating: Option<f64>,
    #[serde(default)]
    pub watched: u64,
    #[serde(default)]
    pub listed: u64,
    #[serde(default)]
    pub liked: u64,
    #[serde(default)]
    pub fans: u64,
}

/// Name and slug of a film, used when rendering change summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmSummary {
    pub id: FilmId,
    pub name: String,
    pub slug: String,
}

impl FilmSummary {
    pub fn new(id: impl Into<FilmId>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
        }
    }

    /// Site-relative path of the film page.
    pub fn path(&self) -> String {
        format!("film/{}/", self.slug)
    }
}

/// Whose rating distribution to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistogramSubject {
    /// Film slug
    Film(String),
    /// Canonical username
    User(String),
}

/// Counters shown on a profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub watched: u64,
    pub watched_this_year: u64,
    pub lists: u64,
    pub following: u64,
    pub followers: u64,
    /// Only visible to the account owner
    #[serde(default)]
    pub blocked: Option<u64>,
}
