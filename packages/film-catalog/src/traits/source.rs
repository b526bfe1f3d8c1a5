//! Page and entry sources.
//!
//! A [`PageSource`] yields one page of typed records at a time and is what
//! the paginated collector drives. An [`EntrySource`] is one input to a
//! master list: it knows how to gather its film ids and how to present
//! itself in the generated description.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ClientResult, Result};
use crate::pipeline::paginate::Paginator;
use crate::traits::client::CatalogClient;
use crate::types::{
    page::{PageRequest, PageResult},
    record::{FilmId, FilmRecord, Member},
};

/// Something that can be fetched page by page.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    /// Items per page, used when a page reports only a total item count.
    fn page_size(&self) -> Option<u32> {
        None
    }

    /// Short description for log lines.
    fn describe(&self) -> String;

    /// Fetch one 1-based page.
    async fn fetch_page(&self, page: u32) -> ClientResult<PageResult<Self::Item>>;
}

/// Film listing at a resource path.
pub struct FilmPages<'a, C: CatalogClient + ?Sized> {
    client: &'a C,
    path: String,
    filters: Option<String>,
    page_size: Option<u32>,
}

impl<'a, C: CatalogClient + ?Sized> FilmPages<'a, C> {
    pub fn new(client: &'a C, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            filters: None,
            page_size: None,
        }
    }

    pub fn with_filters(mut self, filters: Option<String>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl<'a, C: CatalogClient + ?Sized> PageSource for FilmPages<'a, C> {
    type Item = FilmRecord;

    fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    fn describe(&self) -> String {
        self.path.clone()
    }

    async fn fetch_page(&self, page: u32) -> ClientResult<PageResult<FilmRecord>> {
        let request = PageRequest::new(&self.path, page).with_filters(self.filters.clone());
        self.client.fetch_films(&request).await
    }
}

/// Member listing (followers, following, blocked) at a resource path.
pub struct MemberPages<'a, C: CatalogClient + ?Sized> {
    client: &'a C,
    path: String,
    page_size: Option<u32>,
    known_total: Option<u64>,
}

impl<'a, C: CatalogClient + ?Sized> MemberPages<'a, C> {
    pub fn new(client: &'a C, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            page_size: None,
            known_total: None,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Total member count taken from the profile, used when pages carry none.
    pub fn with_known_total(mut self, total: u64) -> Self {
        self.known_total = Some(total);
        self
    }
}

#[async_trait]
impl<'a, C: CatalogClient + ?Sized> PageSource for MemberPages<'a, C> {
    type Item = Member;

    fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    fn describe(&self) -> String {
        self.path.clone()
    }

    async fn fetch_page(&self, page: u32) -> ClientResult<PageResult<Member>> {
        let mut result = self
            .client
            .fetch_members(&PageRequest::new(&self.path, page))
            .await?;
        if result.total_pages.is_none() && result.total_count.is_none() {
            result.total_count = self.known_total;
        }
        Ok(result)
    }
}

/// Kinds of master-list input, in the order their sections are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    List,
    Individual,
    Studio,
    User,
}

impl SourceKind {
    /// Section heading in the generated description.
    pub fn heading(self) -> &'static str {
        match self {
            SourceKind::List => "-- Lists --",
            SourceKind::Individual => "-- Individuals --",
            SourceKind::Studio => "-- Studios --",
            SourceKind::User => "-- Users --",
        }
    }
}

/// How a source is presented in the generated description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLabel {
    /// Link text
    pub title: String,

    /// Site-relative link target
    pub path: String,

    /// Attribution shown after the link (e.g. the list owner's display name)
    pub byline: Option<String>,
}

/// One input to a master list.
#[async_trait]
pub trait EntrySource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Key the source is ordered by within its kind.
    fn sort_key(&self) -> String;

    /// Gather the film ids this source contributes.
    async fn entry_ids(
        &self,
        client: &dyn CatalogClient,
        paginator: &Paginator,
    ) -> Result<Vec<FilmId>>;

    /// Presentation for the generated description.
    async fn label(&self, client: &dyn CatalogClient) -> Result<SourceLabel>;
}
