//! List types - snapshots, full-attribute updates and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::record::{FilmId, FilmRecord, Keyed};

/// Address of a list on the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListRef {
    /// Owner's canonical username
    pub owner: String,

    /// Name as the user typed it; the URL slug is derived from it
    pub name: String,
}

impl ListRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// URL slug for the list name.
    ///
    /// Lower-cased, runs of anything that is not alphanumeric collapse to a
    /// single hyphen.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Path of the public list view.
    pub fn view_path(&self) -> String {
        format!("{}/list/{}/", self.owner, self.slug())
    }

    /// Path of the edit form.
    pub fn edit_path(&self) -> String {
        format!("{}/list/{}/edit/", self.owner, self.slug())
    }
}

/// Lower-case a display name into the hyphenated form the site uses in URLs.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// List metadata as returned by the collaborator (entries are paginated separately).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub ranked: bool,
    pub public: bool,
    #[serde(default)]
    pub description: String,
    /// Number of entries the list reports
    pub entry_count: u64,
}

/// Last-known full attribute state of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSnapshot {
    pub id: u64,
    pub name: String,
    pub tags: Vec<String>,
    pub ranked: bool,
    pub public: bool,
    pub description: String,
    pub entries: Vec<FilmRecord>,
}

impl ListSnapshot {
    pub fn from_details(details: ListDetails, entries: Vec<FilmRecord>) -> Self {
        Self {
            id: details.id,
            name: details.name,
            tags: details.tags,
            ranked: details.ranked,
            public: details.public,
            description: details.description,
            entries,
        }
    }

    pub fn entry_ids(&self) -> Vec<FilmId> {
        self.entries.iter().map(Keyed::key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Named overrides applied on top of a snapshot.
///
/// Every field left `None` keeps the snapshot's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOverrides {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub public: Option<bool>,
    pub ranked: Option<bool>,
    pub description: Option<String>,
    pub entries: Option<Vec<FilmRecord>>,
}

impl ListOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = Some(public);
        self
    }

    pub fn ranked(mut self, ranked: bool) -> Self {
        self.ranked = Some(ranked);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn entries(mut self, entries: Vec<FilmRecord>) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A complete replacement of a list's attributes.
///
/// The site has no partial update, so every save resends the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListUpdateRequest {
    /// `None` creates a new list
    pub list_id: Option<u64>,
    pub name: String,
    pub tags: Vec<String>,
    pub public: bool,
    pub ranked: bool,
    pub description: String,
    pub entries: Vec<FilmRecord>,
}

impl ListUpdateRequest {
    /// Merge overrides onto a snapshot.
    pub fn from_snapshot(snapshot: &ListSnapshot, overrides: ListOverrides) -> Self {
        Self {
            list_id: Some(snapshot.id),
            name: overrides.name.unwrap_or_else(|| snapshot.name.clone()),
            tags: overrides.tags.unwrap_or_else(|| snapshot.tags.clone()),
            public: overrides.public.unwrap_or(snapshot.public),
            ranked: overrides.ranked.unwrap_or(snapshot.ranked),
            description: overrides
                .description
                .unwrap_or_else(|| snapshot.description.clone()),
            entries: overrides
                .entries
                .unwrap_or_else(|| snapshot.entries.clone()),
        }
    }

    /// Save-list form fields in submission order.
    pub fn form_fields(&self) -> Result<Vec<(String, String)>> {
        let mut fields = vec![
            (
                "filmListId".to_string(),
                self.list_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            ("name".to_string(), self.name.clone()),
            ("tags".to_string(), String::new()),
        ];
        fields.extend(self.tags.iter().map(|t| ("tag".to_string(), t.clone())));
        fields.push(("publicList".to_string(), self.public.to_string()));
        fields.push(("numberedList".to_string(), self.ranked.to_string()));
        fields.push(("notes".to_string(), self.description.clone()));
        fields.push(("entries".to_string(), serde_json::to_string(&self.entries)?));
        Ok(fields)
    }

    pub fn entry_ids(&self) -> Vec<FilmId> {
        self.entries.iter().map(Keyed::key).collect()
    }
}

/// Attributes for creating a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewList {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub ranked: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<FilmRecord>,
}

impl NewList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn ranked(mut self) -> Self {
        self.ranked = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_entries(mut self, entries: Vec<FilmRecord>) -> Self {
        self.entries = entries;
        self
    }

    pub fn into_request(self) -> ListUpdateRequest {
        ListUpdateRequest {
            list_id: None,
            name: self.name,
            tags: self.tags,
            public: self.public,
            ranked: self.ranked,
            description: self.description,
            entries: self.entries,
        }
    }
}

/// A comment left on a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub body: String,
}
