//! Record types - the units collected from listing pages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Anything with a stable identity key.
///
/// Two records with the same key are the same catalog entity, whatever
/// else they carry.
pub trait Keyed {
    type Key: Eq + Hash + Clone + fmt::Debug;

    fn key(&self) -> Self::Key;
}

/// Numeric identifier the site assigns to a film.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilmId(pub u64);

impl FilmId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for FilmId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for FilmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Keyed for FilmId {
    type Key = FilmId;

    fn key(&self) -> FilmId {
        *self
    }
}

/// A film as it appears in a listing, list or search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmRecord {
    /// Site identifier
    pub film_id: FilmId,

    /// Film slug (e.g. `boat-2009`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Site average rating, absent for obscure films
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    /// Too few ratings for a site average
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub obscure: bool,

    /// List note (the `review` field on the edit form)
    #[serde(default, rename = "review", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub contains_spoilers: bool,
}

impl FilmRecord {
    /// Create a bare record holding only the key.
    pub fn new(film_id: impl Into<FilmId>) -> Self {
        Self {
            film_id: film_id.into(),
            link: None,
            rating: None,
            obscure: false,
            note: None,
            contains_spoilers: false,
        }
    }

    /// Set the slug.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Set the site rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Mark as obscure.
    pub fn obscure(mut self) -> Self {
        self.obscure = true;
        self
    }

    /// Attach a list note.
    pub fn with_note(mut self, note: impl Into<String>, contains_spoilers: bool) -> Self {
        self.note = Some(note.into());
        self.contains_spoilers = contains_spoilers;
        self
    }

    /// Copy without the note fields.
    pub fn without_note(&self) -> Self {
        Self {
            note: None,
            contains_spoilers: false,
            ..self.clone()
        }
    }
}

impl From<FilmId> for FilmRecord {
    fn from(id: FilmId) -> Self {
        Self::new(id)
    }
}

impl Keyed for FilmRecord {
    type Key = FilmId;

    fn key(&self) -> FilmId {
        self.film_id
    }
}

/// A site member as listed on follower/following/blocked pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Canonical username (the one in profile URLs)
    pub username: String,

    /// Name shown on the profile, when the page carried it
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Member {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
        }
    }
}

impl Keyed for Member {
    type Key = String;

    fn key(&self) -> String {
        self.username.clone()
    }
}
