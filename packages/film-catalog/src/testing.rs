//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the film catalog
//! library without a live session against the site.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{ClientError, ClientResult, Result};
use crate::pipeline::paginate::Paginator;
use crate::traits::{
    client::CatalogClient,
    source::{EntrySource, PageSource, SourceKind, SourceLabel},
};
use crate::types::{
    config::LIST_PAGE_SIZE,
    film::{FilmDetails, FilmSummary, HistogramSubject, ProfileStats},
    list::{slugify, Comment, ListDetails, ListRef, ListUpdateRequest},
    page::{PageRequest, PageResult},
    record::{FilmId, FilmRecord, Member},
    search::SearchOptions,
};

fn normalize(path: &str) -> String {
    format!("{}/", path.trim_matches('/'))
}

fn page_of<T: Clone>(pages: &[Vec<T>], page: u32) -> Vec<T> {
    pages
        .get(page.saturating_sub(1) as usize)
        .cloned()
        .unwrap_or_default()
}

/// A list held by the mock: where it lives plus its metadata.
#[derive(Debug, Clone)]
struct StoredList {
    owner: String,
    details: ListDetails,
    entries: Vec<FilmRecord>,
}

impl StoredList {
    fn view_path(&self) -> String {
        ListRef::new(&self.owner, &self.details.name).view_path()
    }
}

/// A mock session collaborator for testing.
///
/// Holds pages, histograms, films, profiles, lists and comments in memory.
/// List updates are applied to the stored lists so a reload sees them.
#[derive(Default)]
pub struct MockCatalog {
    username: String,

    options: SearchOptions,

    /// Film pages by resource path
    film_pages: Arc<RwLock<HashMap<String, Vec<Vec<FilmRecord>>>>>,

    /// Total film count reported instead of a page count, by resource path
    film_counts: Arc<RwLock<HashMap<String, u64>>>,

    /// Member pages by resource path
    member_pages: Arc<RwLock<HashMap<String, Vec<Vec<Member>>>>>,

    histograms: Arc<RwLock<HashMap<HistogramSubject, Vec<u64>>>>,

    films: Arc<RwLock<HashMap<String, FilmDetails>>>,

    summaries: Arc<RwLock<HashMap<FilmId, FilmSummary>>>,

    profiles: Arc<RwLock<HashMap<String, ProfileStats>>>,

    display_names: Arc<RwLock<HashMap<String, String>>>,

    /// Lists by id
    lists: Arc<RwLock<HashMap<u64, StoredList>>>,

    comments: Arc<RwLock<HashMap<u64, Vec<Comment>>>>,

    next_id: Arc<RwLock<u64>>,

    /// (path, page) pairs that fail
    fail_pages: Arc<RwLock<HashSet<(String, u32)>>>,

    fail_updates: Arc<RwLock<bool>>,

    /// Every list update submitted, in order
    updates: Arc<RwLock<Vec<ListUpdateRequest>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockCatalogCall>>>,
}

/// Record of a call made to the mock catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCatalogCall {
    FetchFilms { path: String, page: u32 },
    FetchMembers { path: String, page: u32 },
    FetchHistogram { subject: HistogramSubject },
    FetchFilm { slug: String },
    FetchProfile { username: String },
    FetchList { owner: String, slug: String },
    DescribeFilms { count: usize },
    SubmitListUpdate { list_id: Option<u64>, entries: usize },
    DeleteList { list_id: u64 },
    FetchComments { list_id: u64 },
    SubmitComment { list_id: u64 },
    DeleteComment { comment_id: u64 },
    ResolveDisplayName { username: String },
}

impl MockCatalog {
    /// Create a mock logged in as `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            next_id: Arc::new(RwLock::new(1000)),
            ..Default::default()
        }
    }

    /// Replace the session's search vocabulary.
    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Add film pages at a path; every page reports the page count.
    pub fn with_film_pages(self, path: &str, pages: Vec<Vec<FilmRecord>>) -> Self {
        self.film_pages.write().unwrap().insert(normalize(path), pages);
        self
    }

    /// Add film pages that report a total film count instead of a page count.
    pub fn with_counted_film_pages(
        self,
        path: &str,
        pages: Vec<Vec<FilmRecord>>,
        total: u64,
    ) -> Self {
        self.film_counts.write().unwrap().insert(normalize(path), total);
        self.with_film_pages(path, pages)
    }

    /// Add a single page of bare film ids at a path.
    pub fn with_films_at(self, path: &str, ids: &[u64]) -> Self {
        let records = ids.iter().map(|id| FilmRecord::new(*id)).collect();
        self.with_film_pages(path, vec![records])
    }

    /// Add member pages at a path (pages carry no totals).
    pub fn with_member_pages(self, path: &str, pages: Vec<Vec<Member>>) -> Self {
        self.member_pages.write().unwrap().insert(normalize(path), pages);
        self
    }

    pub fn with_histogram(self, subject: HistogramSubject, buckets: Vec<u64>) -> Self {
        self.histograms.write().unwrap().insert(subject, buckets);
        self
    }

    pub fn with_film(self, slug: impl Into<String>, details: FilmDetails) -> Self {
        self.films.write().unwrap().insert(slug.into(), details);
        self
    }

    /// Add a name/slug summary used when rendering change sections.
    pub fn with_summary(self, summary: FilmSummary) -> Self {
        self.summaries.write().unwrap().insert(summary.id, summary);
        self
    }

    /// Add summaries named `Film {id}` with slug `film-{id}`.
    pub fn with_generated_summaries(self, ids: impl IntoIterator<Item = u64>) -> Self {
        {
            let mut summaries = self.summaries.write().unwrap();
            for id in ids {
                summaries.insert(
                    FilmId(id),
                    FilmSummary::new(id, format!("Film {}", id), format!("film-{}", id)),
                );
            }
        }
        self
    }

    pub fn with_profile(self, username: impl Into<String>, stats: ProfileStats) -> Self {
        self.profiles.write().unwrap().insert(username.into(), stats);
        self
    }

    pub fn with_display_name(self, username: impl Into<String>, display: impl Into<String>) -> Self {
        self.display_names
            .write()
            .unwrap()
            .insert(username.into(), display.into());
        self
    }

    /// Add a list owned by `owner`.
    pub fn with_list(
        self,
        owner: impl Into<String>,
        details: ListDetails,
        entries: Vec<FilmRecord>,
    ) -> Self {
        let stored = StoredList {
            owner: owner.into(),
            details,
            entries,
        };
        self.store_list(stored);
        self
    }

    pub fn with_comment(self, list_id: u64, comment: Comment) -> Self {
        self.comments
            .write()
            .unwrap()
            .entry(list_id)
            .or_default()
            .push(comment);
        self
    }

    /// Make one page of a path fail.
    pub fn fail_page(self, path: &str, page: u32) -> Self {
        self.fail_pages.write().unwrap().insert((normalize(path), page));
        self
    }

    /// Make every list update fail.
    pub fn fail_updates(self) -> Self {
        *self.fail_updates.write().unwrap() = true;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockCatalogCall> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Every list update submitted so far.
    pub fn updates(&self) -> Vec<ListUpdateRequest> {
        self.updates.read().unwrap().clone()
    }

    /// Stored state of a list.
    pub fn stored_list(&self, list_id: u64) -> Option<(ListDetails, Vec<FilmRecord>)> {
        self.lists
            .read()
            .unwrap()
            .get(&list_id)
            .map(|l| (l.details.clone(), l.entries.clone()))
    }

    /// Id of the list `owner` has under `name`.
    pub fn list_id(&self, owner: &str, name: &str) -> Option<u64> {
        let slug = slugify(name);
        self.lists
            .read()
            .unwrap()
            .values()
            .find(|l| l.owner == owner && slugify(&l.details.name) == slug)
            .map(|l| l.details.id)
    }

    pub fn comments_on(&self, list_id: u64) -> Vec<Comment> {
        self.comments
            .read()
            .unwrap()
            .get(&list_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: MockCatalogCall) {
        self.calls.write().unwrap().push(call);
    }

    fn next_id(&self) -> u64 {
        let mut next = self.next_id.write().unwrap();
        *next += 1;
        *next
    }

    fn store_list(&self, stored: StoredList) {
        let pages: Vec<Vec<FilmRecord>> = if stored.entries.is_empty() {
            vec![Vec::new()]
        } else {
            stored
                .entries
                .chunks(LIST_PAGE_SIZE as usize)
                .map(<[FilmRecord]>::to_vec)
                .collect()
        };
        self.film_pages
            .write()
            .unwrap()
            .insert(normalize(&stored.view_path()), pages);
        self.lists
            .write()
            .unwrap()
            .insert(stored.details.id, stored);
    }

    fn check_failure(&self, path: &str, page: u32) -> ClientResult<()> {
        if self
            .fail_pages
            .read()
            .unwrap()
            .contains(&(path.to_string(), page))
        {
            return Err(ClientError::Site {
                message: format!("mock failure for {} page {}", path, page),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    fn session_username(&self) -> &str {
        &self.username
    }

    fn search_options(&self) -> &SearchOptions {
        &self.options
    }

    async fn fetch_films(&self, request: &PageRequest) -> ClientResult<PageResult<FilmRecord>> {
        let path = normalize(&request.path);
        self.record(MockCatalogCall::FetchFilms {
            path: path.clone(),
            page: request.page,
        });
        self.check_failure(&path, request.page)?;

        let pages = self.film_pages.read().unwrap();
        let stored = pages.get(&path).ok_or_else(|| ClientError::NotFound {
            resource: path.clone(),
        })?;
        let result = PageResult::new(request.page, page_of(stored, request.page));
        match self.film_counts.read().unwrap().get(&path) {
            Some(total) => Ok(result.with_total_count(*total)),
            None => Ok(result.with_total_pages(stored.len() as u32)),
        }
    }

    async fn fetch_members(&self, request: &PageRequest) -> ClientResult<PageResult<Member>> {
        let path = normalize(&request.path);
        self.record(MockCatalogCall::FetchMembers {
            path: path.clone(),
            page: request.page,
        });
        self.check_failure(&path, request.page)?;

        let pages = self.member_pages.read().unwrap();
        let stored = pages.get(&path).ok_or_else(|| ClientError::NotFound {
            resource: path.clone(),
        })?;
        Ok(PageResult::new(request.page, page_of(stored, request.page)))
    }

    async fn fetch_histogram(&self, subject: &HistogramSubject) -> ClientResult<Vec<u64>> {
        self.record(MockCatalogCall::FetchHistogram {
            subject: subject.clone(),
        });
        self.histograms
            .read()
            .unwrap()
            .get(subject)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("{:?}", subject),
            })
    }

    async fn fetch_film(&self, slug: &str) -> ClientResult<FilmDetails> {
        self.record(MockCatalogCall::FetchFilm {
            slug: slug.to_string(),
        });
        self.films
            .read()
            .unwrap()
            .get(slug)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("film/{}/", slug),
            })
    }

    async fn fetch_profile(&self, username: &str) -> ClientResult<ProfileStats> {
        self.record(MockCatalogCall::FetchProfile {
            username: username.to_string(),
        });
        self.profiles
            .read()
            .unwrap()
            .get(username)
            .copied()
            .ok_or_else(|| ClientError::NotFound {
                resource: format!("{}/", username),
            })
    }

    async fn fetch_list(&self, list: &ListRef) -> ClientResult<ListDetails> {
        let slug = list.slug();
        self.record(MockCatalogCall::FetchList {
            owner: list.owner.clone(),
            slug: slug.clone(),
        });
        self.lists
            .read()
            .unwrap()
            .values()
            .find(|l| l.owner == list.owner && slugify(&l.details.name) == slug)
            .map(|l| ListDetails {
                entry_count: l.entries.len() as u64,
                ..l.details.clone()
            })
            .ok_or_else(|| ClientError::NotFound {
                resource: list.view_path(),
            })
    }

    async fn describe_films(&self, ids: &[FilmId]) -> ClientResult<Vec<FilmSummary>> {
        self.record(MockCatalogCall::DescribeFilms { count: ids.len() });
        let summaries = self.summaries.read().unwrap();
        Ok(ids.iter().filter_map(|id| summaries.get(id).cloned()).collect())
    }

    async fn submit_list_update(&self, request: &ListUpdateRequest) -> ClientResult<()> {
        self.record(MockCatalogCall::SubmitListUpdate {
            list_id: request.list_id,
            entries: request.entries.len(),
        });
        if *self.fail_updates.read().unwrap() {
            return Err(ClientError::Site {
                message: "mock update failure".to_string(),
            });
        }
        self.updates.write().unwrap().push(request.clone());

        let id = match request.list_id {
            Some(id) => {
                let previous = self.lists.write().unwrap().remove(&id).ok_or_else(|| {
                    ClientError::NotFound {
                        resource: format!("list {}", id),
                    }
                })?;
                self.film_pages
                    .write()
                    .unwrap()
                    .remove(&normalize(&previous.view_path()));
                id
            }
            None => self.next_id(),
        };
        self.store_list(StoredList {
            owner: self.username.clone(),
            details: ListDetails {
                id,
                name: request.name.clone(),
                tags: request.tags.clone(),
                ranked: request.ranked,
                public: request.public,
                description: request.description.clone(),
                entry_count: request.entries.len() as u64,
            },
            entries: request.entries.clone(),
        });
        Ok(())
    }

    async fn delete_list(&self, list_id: u64) -> ClientResult<()> {
        self.record(MockCatalogCall::DeleteList { list_id });
        let removed = self.lists.write().unwrap().remove(&list_id);
        match removed {
            Some(list) => {
                self.film_pages
                    .write()
                    .unwrap()
                    .remove(&normalize(&list.view_path()));
                Ok(())
            }
            None => Err(ClientError::NotFound {
                resource: format!("list {}", list_id),
            }),
        }
    }

    async fn fetch_comments(&self, list_id: u64) -> ClientResult<Vec<Comment>> {
        self.record(MockCatalogCall::FetchComments { list_id });
        Ok(self.comments_on(list_id))
    }

    async fn submit_comment(&self, list_id: u64, text: &str) -> ClientResult<()> {
        self.record(MockCatalogCall::SubmitComment { list_id });
        let id = self.next_id();
        let comment = Comment {
            id,
            username: self.username.clone(),
            created_at: Utc
                .timestamp_opt(1_600_000_000 + id as i64, 0)
                .earliest()
                .unwrap_or_else(Utc::now),
            body: text.to_string(),
        };
        self.comments
            .write()
            .unwrap()
            .entry(list_id)
            .or_default()
            .push(comment);
        Ok(())
    }

    async fn delete_comment(&self, comment_id: u64) -> ClientResult<()> {
        self.record(MockCatalogCall::DeleteComment { comment_id });
        let mut comments = self.comments.write().unwrap();
        for list in comments.values_mut() {
            if let Some(pos) = list.iter().position(|c| c.id == comment_id) {
                list.remove(pos);
                return Ok(());
            }
        }
        Err(ClientError::NotFound {
            resource: format!("comment {}", comment_id),
        })
    }

    async fn resolve_display_name(&self, username: &str) -> ClientResult<String> {
        self.record(MockCatalogCall::ResolveDisplayName {
            username: username.to_string(),
        });
        Ok(self
            .display_names
            .read()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_else(|| username.to_string()))
    }
}

/// A [`PageSource`] over fixed pages, for driving the collector directly.
pub struct StaticPages<T> {
    pages: Vec<Vec<T>>,
    reporting: Reporting,
    fail_at: Option<u32>,
    fetched: RwLock<Vec<u32>>,
}

enum Reporting {
    Pages,
    Count { total: u64, page_size: u32 },
    Nothing,
}

impl<T> StaticPages<T> {
    /// Every page reports the number of pages.
    pub fn new(pages: Vec<Vec<T>>) -> Self {
        Self {
            pages,
            reporting: Reporting::Pages,
            fail_at: None,
            fetched: RwLock::new(Vec::new()),
        }
    }

    /// Pages report a total item count; the page size is advertised.
    pub fn reporting_count(mut self, total: u64, page_size: u32) -> Self {
        self.reporting = Reporting::Count { total, page_size };
        self
    }

    /// Pages report no totals at all.
    pub fn without_totals(mut self) -> Self {
        self.reporting = Reporting::Nothing;
        self
    }

    pub fn failing_at(mut self, page: u32) -> Self {
        self.fail_at = Some(page);
        self
    }

    /// Pages requested so far, in order.
    pub fn fetched_pages(&self) -> Vec<u32> {
        self.fetched.read().unwrap().clone()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> PageSource for StaticPages<T> {
    type Item = T;

    fn page_size(&self) -> Option<u32> {
        match self.reporting {
            Reporting::Count { page_size, .. } => Some(page_size),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        format!("static ({} pages)", self.pages.len())
    }

    async fn fetch_page(&self, page: u32) -> ClientResult<PageResult<T>> {
        self.fetched.write().unwrap().push(page);
        if self.fail_at == Some(page) {
            return Err(ClientError::Site {
                message: format!("page {} unavailable", page),
            });
        }
        let result = PageResult::new(page, page_of(&self.pages, page));
        Ok(match self.reporting {
            Reporting::Pages => result.with_total_pages(self.pages.len() as u32),
            Reporting::Count { total, .. } => result.with_total_count(total),
            Reporting::Nothing => result,
        })
    }
}

/// A master-list source with fixed entries.
#[derive(Debug, Clone)]
pub struct StaticSource {
    kind: SourceKind,
    label: SourceLabel,
    ids: Vec<FilmId>,
}

impl StaticSource {
    pub fn new(kind: SourceKind, title: impl Into<String>, ids: &[u64]) -> Self {
        let title = title.into();
        Self {
            kind,
            label: SourceLabel {
                path: format!("{}/", slugify(&title)),
                title,
                byline: None,
            },
            ids: ids.iter().copied().map(FilmId).collect(),
        }
    }
}

#[async_trait]
impl EntrySource for StaticSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn sort_key(&self) -> String {
        self.label.title.clone()
    }

    async fn entry_ids(
        &self,
        _client: &dyn CatalogClient,
        _paginator: &Paginator,
    ) -> Result<Vec<FilmId>> {
        Ok(self.ids.clone())
    }

    async fn label(&self, _client: &dyn CatalogClient) -> Result<SourceLabel> {
        Ok(self.label.clone())
    }
}
