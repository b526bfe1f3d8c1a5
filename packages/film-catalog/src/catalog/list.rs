//! Reading other members' lists and editing the session user's own.
//!
//! The site has no partial update: every change to an [`OwnedList`] sends
//! the complete attribute set built from the last snapshot, then reloads.

use tracing::{info, warn};

use crate::error::{CatalogError, Result};
use crate::pipeline::algebra::{difference, duplicate_count, merge, replace, unique_by_key};
use crate::pipeline::changes::{DescriptionRenderer, EntryDiff};
use crate::pipeline::master::{MasterList, MasterListOutcome};
use crate::pipeline::paginate::Paginator;
use crate::traits::client::CatalogClient;
use crate::traits::source::FilmPages;
use crate::types::config::{CollectRequest, MasterListConfig, LIST_PAGE_SIZE};
use crate::types::list::{
    Comment, ListOverrides, ListRef, ListSnapshot, ListUpdateRequest, NewList,
};
use crate::types::record::{FilmId, FilmRecord};

/// Fetch list metadata and every entry page.
pub async fn load_snapshot(
    client: &dyn CatalogClient,
    list: &ListRef,
    filters: Option<String>,
    paginator: &Paginator,
) -> Result<ListSnapshot> {
    let details = client.fetch_list(list).await?;
    let pages = FilmPages::new(client, list.view_path())
        .with_filters(filters)
        .with_page_size(LIST_PAGE_SIZE);
    let entries = paginator.collect(&pages, &CollectRequest::all()).await?;
    Ok(ListSnapshot::from_details(details, entries))
}

fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::invalid("name", "list name cannot be empty"));
    }
    Ok(())
}

/// Another member's list, read only.
pub struct CatalogList<'a> {
    client: &'a dyn CatalogClient,
    list: ListRef,
    filters: Option<String>,
    paginator: Paginator,
    snapshot: ListSnapshot,
}

impl<'a> CatalogList<'a> {
    pub async fn load(
        client: &'a dyn CatalogClient,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<CatalogList<'a>> {
        let no_filters: &[&str] = &[];
        Self::load_filtered(client, owner, name, no_filters).await
    }

    /// Load with `type-category` filter tokens applied to the entries.
    pub async fn load_filtered<S: AsRef<str>>(
        client: &'a dyn CatalogClient,
        owner: impl Into<String>,
        name: impl Into<String>,
        filters: &[S],
    ) -> Result<CatalogList<'a>> {
        let list = ListRef::new(owner, name);
        require_name(&list.name)?;
        if list.owner == client.session_username() {
            return Err(CatalogError::invalid(
                "owner",
                "the session user's own lists are loaded as OwnedList",
            ));
        }
        let filters = client.search_options().encode_filters(filters)?;
        let paginator = Paginator::default();
        let snapshot = load_snapshot(client, &list, filters.clone(), &paginator).await?;
        Ok(CatalogList {
            client,
            list,
            filters,
            paginator,
            snapshot,
        })
    }

    pub async fn reload(&mut self) -> Result<()> {
        self.snapshot =
            load_snapshot(self.client, &self.list, self.filters.clone(), &self.paginator).await?;
        Ok(())
    }

    pub fn list_ref(&self) -> &ListRef {
        &self.list
    }

    pub fn snapshot(&self) -> &ListSnapshot {
        &self.snapshot
    }

    pub fn entries(&self) -> &[FilmRecord] {
        &self.snapshot.entries
    }

    pub fn entry_ids(&self) -> Vec<FilmId> {
        self.snapshot.entry_ids()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

/// A list owned by the session user.
pub struct OwnedList<'a> {
    client: &'a dyn CatalogClient,
    list: ListRef,
    paginator: Paginator,
    config: MasterListConfig,
    snapshot: ListSnapshot,
}

impl<'a> OwnedList<'a> {
    /// Load an existing list of the session user.
    pub async fn load(client: &'a dyn CatalogClient, name: impl Into<String>) -> Result<OwnedList<'a>> {
        Self::load_with(client, name, Paginator::default(), MasterListConfig::default()).await
    }

    /// Load with a specific paginator and description settings.
    ///
    /// Duplicate entries found on load are removed by resubmitting the list.
    pub async fn load_with(
        client: &'a dyn CatalogClient,
        name: impl Into<String>,
        paginator: Paginator,
        config: MasterListConfig,
    ) -> Result<OwnedList<'a>> {
        let list = ListRef::new(client.session_username(), name);
        require_name(&list.name)?;
        let snapshot = load_snapshot(client, &list, None, &paginator).await?;
        let mut owned = OwnedList {
            client,
            list,
            paginator,
            config,
            snapshot,
        };

        let duplicates = duplicate_count(&owned.snapshot.entries);
        if duplicates > 0 {
            warn!(list = %owned.list.name, duplicates, "Removing duplicate list entries");
            let unique = unique_by_key(&owned.snapshot.entries);
            owned
                .update(ListOverrides::new().entries(unique), false)
                .await?;
        }
        Ok(owned)
    }

    /// Create a list and load it.
    pub async fn create(client: &'a dyn CatalogClient, new: NewList) -> Result<OwnedList<'a>> {
        require_name(&new.name)?;
        let name = new.name.clone();
        client.submit_list_update(&new.into_request()).await?;
        info!(list = %name, "Created list");
        Self::load(client, name).await
    }

    pub fn list_ref(&self) -> &ListRef {
        &self.list
    }

    pub fn snapshot(&self) -> &ListSnapshot {
        &self.snapshot
    }

    pub fn id(&self) -> u64 {
        self.snapshot.id
    }

    pub fn name(&self) -> &str {
        &self.snapshot.name
    }

    pub fn tags(&self) -> &[String] {
        &self.snapshot.tags
    }

    pub fn is_public(&self) -> bool {
        self.snapshot.public
    }

    pub fn is_ranked(&self) -> bool {
        self.snapshot.ranked
    }

    pub fn description(&self) -> &str {
        &self.snapshot.description
    }

    pub fn entries(&self) -> &[FilmRecord] {
        &self.snapshot.entries
    }

    pub fn entry_ids(&self) -> Vec<FilmId> {
        self.snapshot.entry_ids()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub async fn reload(&mut self) -> Result<()> {
        self.snapshot = load_snapshot(self.client, &self.list, None, &self.paginator).await?;
        Ok(())
    }

    /// Save the snapshot with `overrides` applied, then reload.
    ///
    /// With `show_changes`, the generated part of the description is
    /// replaced by the films added and removed by this update.
    pub async fn update(&mut self, overrides: ListOverrides, show_changes: bool) -> Result<()> {
        let mut request = ListUpdateRequest::from_snapshot(&self.snapshot, overrides);
        require_name(&request.name)?;

        if show_changes {
            let diff = EntryDiff::between(&self.snapshot.entry_ids(), &request.entry_ids());
            let renderer = DescriptionRenderer::new(&self.config);
            match renderer.render_changes(self.client, &diff).await? {
                Some(changes) => request.description = renderer.compose(&request.description, &changes),
                None => info!(list = %self.list.name, "No entry changes to show"),
            }
        }

        self.client.submit_list_update(&request).await?;
        info!(
            list = %request.name,
            entries = request.entries.len(),
            "List updated"
        );
        if request.name != self.list.name {
            self.list.name = request.name;
        }
        self.reload().await
    }

    /// Remove every entry and make the list private.
    pub async fn clear(&mut self) -> Result<()> {
        self.update(ListOverrides::new().public(false).entries(Vec::new()), false)
            .await
    }

    /// Replace all entries; returns `false` without saving when `entries` is empty.
    pub async fn replace<U: Into<FilmRecord>>(
        &mut self,
        entries: impl IntoIterator<Item = U>,
        show_changes: bool,
    ) -> Result<bool> {
        let records: Vec<FilmRecord> = replace(entries);
        if records.is_empty() {
            return Ok(false);
        }
        self.update(ListOverrides::new().entries(records), show_changes)
            .await?;
        Ok(true)
    }

    /// Add entries after the existing ones, skipping films already listed.
    pub async fn append<U: Into<FilmRecord>>(
        &mut self,
        entries: impl IntoIterator<Item = U>,
        show_changes: bool,
    ) -> Result<()> {
        let incoming: Vec<FilmRecord> = entries.into_iter().map(Into::into).collect();
        let merged = merge([self.snapshot.entries.as_slice(), incoming.as_slice()]);
        self.update(ListOverrides::new().entries(merged), show_changes)
            .await
    }

    /// Drop the given films from the list.
    pub async fn remove(&mut self, ids: &[FilmId], show_changes: bool) -> Result<()> {
        let remaining = difference(&self.snapshot.entries, ids);
        self.update(ListOverrides::new().entries(remaining), show_changes)
            .await
    }

    pub async fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        self.update(ListOverrides::new().name(name), false).await
    }

    pub async fn set_tags(&mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Result<()> {
        self.update(ListOverrides::new().tags(tags), false).await
    }

    /// Change visibility; `Ok(false)` when already set. An empty list cannot be published.
    pub async fn set_public(&mut self, public: bool) -> Result<bool> {
        if public && self.snapshot.is_empty() {
            return Err(CatalogError::invalid("public", "an empty list cannot be made public"));
        }
        if public == self.snapshot.public {
            return Ok(false);
        }
        self.update(ListOverrides::new().public(public), false).await?;
        Ok(true)
    }

    /// Toggle numbering; `Ok(false)` when already set.
    pub async fn set_ranked(&mut self, ranked: bool) -> Result<bool> {
        if ranked == self.snapshot.ranked {
            return Ok(false);
        }
        self.update(ListOverrides::new().ranked(ranked), false).await?;
        Ok(true)
    }

    pub async fn set_description(&mut self, text: impl Into<String>) -> Result<()> {
        self.update(ListOverrides::new().description(text), false)
            .await
    }

    /// Delete the list on the site. The handle is consumed.
    pub async fn delete(self) -> Result<()> {
        self.client.delete_list(self.snapshot.id).await?;
        info!(list = %self.list.name, "Deleted list");
        Ok(())
    }

    pub async fn comments(&self) -> Result<Vec<Comment>> {
        Ok(self.client.fetch_comments(self.snapshot.id).await?)
    }

    pub async fn add_comment(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(CatalogError::invalid("text", "comment cannot be empty"));
        }
        Ok(self.client.submit_comment(self.snapshot.id, text).await?)
    }

    /// Delete one of the comments currently on the list.
    pub async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        let comments = self.comments().await?;
        if !comments.iter().any(|c| c.id == comment_id) {
            return Err(CatalogError::invalid(
                "comment_id",
                format!("no comment {} on list {}", comment_id, self.list.name),
            ));
        }
        Ok(self.client.delete_comment(comment_id).await?)
    }

    /// Rebuild this list from the sources of `master`.
    pub async fn master_update(&mut self, master: &MasterList) -> Result<MasterListOutcome> {
        master.run(self.client, &mut self.snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCatalog, MockCatalogCall, StaticSource};
    use crate::traits::source::SourceKind;
    use crate::types::list::ListDetails;
    use chrono::{TimeZone, Utc};

    fn details(id: u64, name: &str) -> ListDetails {
        ListDetails {
            id,
            name: name.into(),
            tags: vec![],
            ranked: false,
            public: false,
            description: String::new(),
            entry_count: 0,
        }
    }

    fn records(ids: &[u64]) -> Vec<FilmRecord> {
        ids.iter().map(|id| FilmRecord::new(*id)).collect()
    }

    fn ids(raw: &[u64]) -> Vec<FilmId> {
        raw.iter().copied().map(FilmId).collect()
    }

    fn client() -> MockCatalog {
        MockCatalog::new("me")
            .with_generated_summaries(1..=200)
            .with_list("me", details(1, "Favourites"), records(&[1, 2, 3]))
            .with_list("me", details(2, "Empty"), vec![])
            .with_list("bob", details(3, "Bob's Picks"), records(&[7, 8]))
    }

    #[tokio::test]
    async fn test_catalog_list_loads_entries_across_pages() {
        let many: Vec<FilmRecord> = (1..=150u64).map(FilmRecord::new).collect();
        let client = client().with_list("bob", details(4, "Big"), many);
        let list = CatalogList::load(&client, "bob", "Big").await.unwrap();
        assert_eq!(list.len(), 150);
        assert_eq!(list.entry_ids()[149], FilmId(150));
        assert_eq!(list.snapshot().id, 4);
    }

    #[tokio::test]
    async fn test_catalog_list_rejects_own_lists() {
        let client = client();
        assert!(matches!(
            CatalogList::load(&client, "me", "Favourites").await,
            Err(CatalogError::InvalidParameter { name: "owner", .. })
        ));
        assert!(CatalogList::load(&client, "bob", "Bob's Picks").await.is_ok());
    }

    #[tokio::test]
    async fn test_load_removes_duplicates() {
        let client = MockCatalog::new("me").with_list(
            "me",
            details(1, "Dupes"),
            vec![
                FilmRecord::new(1u64),
                FilmRecord::new(2u64),
                FilmRecord::new(1u64).with_note("second", false),
            ],
        );
        let list = OwnedList::load(&client, "Dupes").await.unwrap();
        assert_eq!(list.entry_ids(), ids(&[1, 2]));
        assert_eq!(list.entries()[0].note.as_deref(), Some("second"));
        assert_eq!(client.updates().len(), 1);
    }

    #[tokio::test]
    async fn test_create_uses_defaults() {
        let client = client();
        let list = OwnedList::create(&client, NewList::new("Posters")).await.unwrap();
        assert_eq!(list.name(), "Posters");
        assert!(!list.is_public());
        assert!(!list.is_ranked());
        assert!(list.is_empty());
        assert_eq!(client.updates()[0].list_id, None);
        assert!(client.list_id("me", "Posters").is_some());
    }

    #[tokio::test]
    async fn test_entry_operations() {
        let client = client();
        let mut list = OwnedList::load(&client, "Favourites").await.unwrap();

        list.append([FilmId(3), FilmId(4)], false).await.unwrap();
        assert_eq!(list.entry_ids(), ids(&[1, 2, 3, 4]));

        list.remove(&ids(&[1, 3]), false).await.unwrap();
        assert_eq!(list.entry_ids(), ids(&[2, 4]));

        assert!(list.replace([FilmId(9), FilmId(9), FilmId(8)], false).await.unwrap());
        assert_eq!(list.entry_ids(), ids(&[9, 8]));

        assert!(!list.replace(Vec::<FilmId>::new(), false).await.unwrap());
        assert_eq!(client.updates().len(), 3);
    }

    #[tokio::test]
    async fn test_clear_makes_list_private_in_one_update() {
        let client = client();
        let mut list = OwnedList::load(&client, "Favourites").await.unwrap();
        assert!(list.set_public(true).await.unwrap());
        list.clear().await.unwrap();
        assert!(list.is_empty());
        assert!(!list.is_public());
        let last = client.updates().pop().unwrap();
        assert!(!last.public);
        assert!(last.entries.is_empty());
    }

    #[tokio::test]
    async fn test_visibility_rules() {
        let client = client();
        let mut empty = OwnedList::load(&client, "Empty").await.unwrap();
        assert!(matches!(
            empty.set_public(true).await,
            Err(CatalogError::InvalidParameter { name: "public", .. })
        ));

        let mut list = OwnedList::load(&client, "Favourites").await.unwrap();
        assert!(!list.set_public(false).await.unwrap());
        assert!(!list.set_ranked(false).await.unwrap());
        assert!(client.updates().is_empty());
        assert!(list.set_ranked(true).await.unwrap());
        assert!(list.is_ranked());
    }

    #[tokio::test]
    async fn test_rename_follows_the_list() {
        let client = client();
        let mut list = OwnedList::load(&client, "Favourites").await.unwrap();
        list.rename("All Time Favourites").await.unwrap();
        assert_eq!(list.list_ref().view_path(), "me/list/all-time-favourites/");
        assert_eq!(list.name(), "All Time Favourites");
        assert_eq!(list.entry_ids(), ids(&[1, 2, 3]));

        list.set_tags(["best", "ever"]).await.unwrap();
        assert_eq!(list.tags(), &["best".to_string(), "ever".to_string()]);
    }

    #[tokio::test]
    async fn test_show_changes_rewrites_generated_block() {
        let client = client();
        let mut list = OwnedList::load(&client, "Favourites").await.unwrap();
        list.set_description("My intro").await.unwrap();

        list.append([FilmId(5)], true).await.unwrap();
        let description = list.description();
        assert!(description.starts_with("My intro\n\n===============\n\n"));
        assert!(description.contains("<strong>Last Added</strong>:\n<a href=\"https://letterboxd.com/film/film-5/\">Film 5</a>"));
        assert!(!description.contains("Last Removed"));
    }

    #[tokio::test]
    async fn test_comments() {
        let client = client().with_comment(
            1,
            Comment {
                id: 77,
                username: "bob".into(),
                created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
                body: "nice".into(),
            },
        );
        let list = OwnedList::load(&client, "Favourites").await.unwrap();
        list.add_comment("thanks").await.unwrap();
        assert_eq!(list.comments().await.unwrap().len(), 2);

        assert!(matches!(
            list.delete_comment(5).await,
            Err(CatalogError::InvalidParameter { name: "comment_id", .. })
        ));
        list.delete_comment(77).await.unwrap();
        assert_eq!(client.comments_on(1).len(), 1);
        assert!(list.add_comment("  ").await.is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let client = client();
        let list = OwnedList::load(&client, "Favourites").await.unwrap();
        list.delete().await.unwrap();
        assert!(client.stored_list(1).is_none());
        assert!(client
            .calls()
            .contains(&MockCatalogCall::DeleteList { list_id: 1 }));
    }

    #[tokio::test]
    async fn test_master_update() {
        let client = client();
        let mut list = OwnedList::load(&client, "Favourites").await.unwrap();
        let master = MasterList::new(MasterListConfig::default())
            .with_source(StaticSource::new(SourceKind::List, "Picks", &[10, 2]));

        let outcome = list.master_update(&master).await.unwrap();
        assert!(outcome.updated);
        assert_eq!(list.entry_ids(), ids(&[10, 2]));
        let (stored, entries) = client.stored_list(1).unwrap();
        assert_eq!(stored.description, outcome.description);
        assert_eq!(entries.len(), 2);
    }
}
