//! Master-list sources backed by the site: lists, people, studios and
//! members' ratings.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::rated::RatedSelection;
use crate::error::{CatalogError, ClientError, Result};
use crate::pipeline::algebra::merge;
use crate::pipeline::paginate::Paginator;
use crate::traits::client::CatalogClient;
use crate::traits::source::{EntrySource, FilmPages, SourceKind, SourceLabel};
use crate::types::config::{CollectRequest, LIST_PAGE_SIZE};
use crate::types::list::ListRef;
use crate::types::record::{FilmId, Keyed};

async fn collect_ids(
    client: &dyn CatalogClient,
    paginator: &Paginator,
    path: String,
    filters: Option<String>,
    page_size: Option<u32>,
) -> Result<Vec<FilmId>> {
    let mut pages = FilmPages::new(client, path).with_filters(filters);
    if let Some(size) = page_size {
        pages = pages.with_page_size(size);
    }
    let films = paginator.collect(&pages, &CollectRequest::all()).await?;
    Ok(films.iter().map(Keyed::key).collect())
}

/// Hyphenated lower-case form used in person and studio paths.
fn path_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// Another list whose entries feed the master list.
#[derive(Debug, Clone)]
pub struct ChildList {
    list: ListRef,
    filters: Vec<String>,
}

impl ChildList {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            list: ListRef::new(owner, name),
            filters: Vec::new(),
        }
    }

    /// Only take entries passing these `type-category` filters.
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    pub fn list_ref(&self) -> &ListRef {
        &self.list
    }
}

#[async_trait]
impl EntrySource for ChildList {
    fn kind(&self) -> SourceKind {
        SourceKind::List
    }

    fn sort_key(&self) -> String {
        self.list.name.clone()
    }

    async fn entry_ids(
        &self,
        client: &dyn CatalogClient,
        paginator: &Paginator,
    ) -> Result<Vec<FilmId>> {
        let filters = client.search_options().encode_filters(&self.filters)?;
        collect_ids(
            client,
            paginator,
            self.list.view_path(),
            filters,
            Some(LIST_PAGE_SIZE),
        )
        .await
    }

    async fn label(&self, client: &dyn CatalogClient) -> Result<SourceLabel> {
        let details = client.fetch_list(&self.list).await?;
        let owner = client.resolve_display_name(&self.list.owner).await?;
        Ok(SourceLabel {
            title: details.name,
            path: self.list.view_path(),
            byline: Some(owner),
        })
    }
}

/// Credits a person can have on a film.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Producer,
    Director,
    Actor,
    Writer,
    Editor,
    Composer,
    Cinematography,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Producer,
        Role::Director,
        Role::Actor,
        Role::Writer,
        Role::Editor,
        Role::Composer,
        Role::Cinematography,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Producer => "producer",
            Role::Director => "director",
            Role::Actor => "actor",
            Role::Writer => "writer",
            Role::Editor => "editor",
            Role::Composer => "composer",
            Role::Cinematography => "cinematography",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| CatalogError::invalid("roles", format!("unknown role `{}`", s)))
    }
}

/// A person's films across one or more roles.
#[derive(Debug, Clone)]
pub struct Individual {
    name: String,
    roles: Vec<Role>,
}

impl Individual {
    /// `roles` empty means every role.
    pub fn new(name: impl Into<String>, roles: &[Role]) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::invalid("name", "name cannot be empty"));
        }
        let roles = if roles.is_empty() {
            Role::ALL.to_vec()
        } else {
            let mut unique = Vec::with_capacity(roles.len());
            for role in roles {
                if !unique.contains(role) {
                    unique.push(*role);
                }
            }
            unique
        };
        Ok(Self { name, roles })
    }

    /// Parse role names; any unknown role is rejected.
    pub fn with_role_names<S: AsRef<str>>(name: impl Into<String>, roles: &[S]) -> Result<Self> {
        let roles = roles
            .iter()
            .map(|r| r.as_ref().parse())
            .collect::<Result<Vec<Role>>>()?;
        Self::new(name, &roles)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Last word of the name.
    pub fn surname(&self) -> &str {
        self.name.split_whitespace().last().unwrap_or(&self.name)
    }

    pub fn role_path(&self, role: Role) -> String {
        format!("{}/{}/", role, path_name(&self.name))
    }
}

#[async_trait]
impl EntrySource for Individual {
    fn kind(&self) -> SourceKind {
        SourceKind::Individual
    }

    fn sort_key(&self) -> String {
        self.surname().to_string()
    }

    async fn entry_ids(
        &self,
        client: &dyn CatalogClient,
        paginator: &Paginator,
    ) -> Result<Vec<FilmId>> {
        let mut by_role = Vec::with_capacity(self.roles.len());
        for role in &self.roles {
            match collect_ids(client, paginator, self.role_path(*role), None, None).await {
                Ok(ids) => by_role.push(ids),
                Err(CatalogError::CollectionAborted {
                    source: ClientError::NotFound { .. },
                    ..
                }) => {
                    debug!(name = %self.name, role = %role, "No films in role");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(merge(by_role.iter()))
    }

    async fn label(&self, _client: &dyn CatalogClient) -> Result<SourceLabel> {
        let role = self.roles.first().copied().unwrap_or(Role::Director);
        Ok(SourceLabel {
            title: self.name.clone(),
            path: self.role_path(role),
            byline: None,
        })
    }
}

/// A studio's films.
#[derive(Debug, Clone)]
pub struct Studio {
    name: String,
}

impl Studio {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::invalid("name", "name cannot be empty"));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> String {
        format!("studio/{}/", path_name(&self.name))
    }
}

#[async_trait]
impl EntrySource for Studio {
    fn kind(&self) -> SourceKind {
        SourceKind::Studio
    }

    fn sort_key(&self) -> String {
        self.name.clone()
    }

    async fn entry_ids(
        &self,
        client: &dyn CatalogClient,
        paginator: &Paginator,
    ) -> Result<Vec<FilmId>> {
        collect_ids(client, paginator, self.path(), None, None).await
    }

    async fn label(&self, _client: &dyn CatalogClient) -> Result<SourceLabel> {
        Ok(SourceLabel {
            title: self.name.clone(),
            path: self.path(),
            byline: None,
        })
    }
}

/// Films picked from a member's ratings.
#[derive(Debug, Clone)]
pub struct UserRatings {
    selection: RatedSelection,
}

impl UserRatings {
    pub fn new(selection: RatedSelection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> &RatedSelection {
        &self.selection
    }
}

impl From<RatedSelection> for UserRatings {
    fn from(selection: RatedSelection) -> Self {
        Self::new(selection)
    }
}

#[async_trait]
impl EntrySource for UserRatings {
    fn kind(&self) -> SourceKind {
        SourceKind::User
    }

    fn sort_key(&self) -> String {
        self.selection.username.clone()
    }

    async fn entry_ids(
        &self,
        _client: &dyn CatalogClient,
        _paginator: &Paginator,
    ) -> Result<Vec<FilmId>> {
        Ok(self.selection.film_ids.clone())
    }

    async fn label(&self, _client: &dyn CatalogClient) -> Result<SourceLabel> {
        Ok(SourceLabel {
            title: self.selection.display_name.clone(),
            path: self.selection.path.clone(),
            byline: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::master::MasterList;
    use crate::testing::MockCatalog;
    use crate::types::config::MasterListConfig;
    use crate::types::list::ListDetails;
    use crate::types::record::FilmRecord;

    fn ids(raw: &[u64]) -> Vec<FilmId> {
        raw.iter().copied().map(FilmId).collect()
    }

    fn list_details(id: u64, name: &str) -> ListDetails {
        ListDetails {
            id,
            name: name.into(),
            tags: vec![],
            ranked: false,
            public: true,
            description: String::new(),
            entry_count: 0,
        }
    }

    #[test]
    fn test_roles() {
        assert_eq!("Director".parse::<Role>().unwrap(), Role::Director);
        assert!("gaffer".parse::<Role>().is_err());
        assert!(Individual::with_role_names("Eric Roberts", &["actor", "gaffer"]).is_err());

        let all = Individual::new("Eric Roberts", &[]).unwrap();
        assert_eq!(all.roles().len(), 7);
        assert_eq!(all.surname(), "Roberts");
        assert_eq!(all.role_path(Role::Actor), "actor/eric-roberts/");
    }

    #[tokio::test]
    async fn test_individual_merges_roles_and_skips_missing() {
        let client = MockCatalog::new("me")
            .with_films_at("director/jane-doe/", &[3, 1])
            .with_films_at("writer/jane-doe/", &[1, 4]);
        let person = Individual::new("Jane Doe", &[Role::Director, Role::Actor, Role::Writer]).unwrap();

        let films = person
            .entry_ids(&client, &Paginator::default())
            .await
            .unwrap();
        assert_eq!(films, ids(&[3, 1, 4]));

        let label = person.label(&client).await.unwrap();
        assert_eq!(label.path, "director/jane-doe/");
    }

    #[tokio::test]
    async fn test_individual_other_failures_propagate() {
        let client = MockCatalog::new("me")
            .with_films_at("actor/jane-doe/", &[1])
            .fail_page("actor/jane-doe/", 1);
        let person = Individual::new("Jane Doe", &[Role::Actor]).unwrap();
        assert!(person
            .entry_ids(&client, &Paginator::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_child_list_label_credits_owner() {
        let client = MockCatalog::new("me")
            .with_list("kasey", list_details(5, "Nightmare List"), vec![FilmRecord::new(9u64)])
            .with_display_name("kasey", "Kasey C");
        let child = ChildList::new("kasey", "nightmare list");

        assert_eq!(
            child.entry_ids(&client, &Paginator::default()).await.unwrap(),
            ids(&[9])
        );
        let label = child.label(&client).await.unwrap();
        assert_eq!(label.title, "Nightmare List");
        assert_eq!(label.path, "kasey/list/nightmare-list/");
        assert_eq!(label.byline.as_deref(), Some("Kasey C"));
    }

    #[tokio::test]
    async fn test_master_list_from_catalog_sources() {
        let client = MockCatalog::new("me")
            .with_generated_summaries(1..=10)
            .with_films_at("studio/a24/", &[1, 2])
            .with_films_at("director/ari-aster/", &[2, 3])
            .with_list("me", list_details(1, "Master"), vec![]);
        let selection = RatedSelection {
            username: "bob".into(),
            display_name: "Bobby".into(),
            path: "bob/films/ratings/rated/5/".into(),
            film_ids: ids(&[4]),
        };
        let master = MasterList::new(MasterListConfig::default())
            .with_source(UserRatings::from(selection))
            .with_source(Studio::new("A24").unwrap())
            .with_source(Individual::new("Ari Aster", &[Role::Director]).unwrap());

        let mut list = crate::catalog::list::OwnedList::load(&client, "Master")
            .await
            .unwrap();
        let outcome = list.master_update(&master).await.unwrap();

        assert_eq!(outcome.entries, ids(&[4, 3, 2, 1]));
        let individuals = outcome.description.find("-- Individuals --").unwrap();
        let studios = outcome.description.find("-- Studios --").unwrap();
        let users = outcome.description.find("-- Users --").unwrap();
        assert!(individuals < studios && studios < users);
        assert!(outcome
            .description
            .contains("1. <a href=\"https://letterboxd.com/bob/films/ratings/rated/5/\">Bobby</a>"));
    }
}
