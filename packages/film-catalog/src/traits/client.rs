//! The authenticated session collaborator.
//!
//! Everything that talks to the site - HTTP, cookies, CSRF, login, and
//! turning markup into typed results - sits behind [`CatalogClient`]. The
//! library never holds a global session: a client is passed by reference
//! into every service that needs one.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::{
    film::{FilmDetails, FilmSummary, HistogramSubject, ProfileStats},
    list::{Comment, ListDetails, ListRef, ListUpdateRequest},
    page::{PageRequest, PageResult},
    record::{FilmId, FilmRecord, Member},
    search::SearchOptions,
};

/// Session collaborator for the film-cataloging site.
///
/// Implementations own retries and timeouts; the library makes one attempt
/// per call and expects requests to be serialized by the implementation.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Canonical username of the logged-in user.
    fn session_username(&self) -> &str;

    /// Search vocabulary loaded when the session started.
    fn search_options(&self) -> &SearchOptions;

    /// One page of films from a search, list, studio, person or rated view.
    async fn fetch_films(&self, request: &PageRequest) -> ClientResult<PageResult<FilmRecord>>;

    /// One page of members from a followers/following/blocked view.
    async fn fetch_members(&self, request: &PageRequest) -> ClientResult<PageResult<Member>>;

    /// Raw rating buckets (0.5 stars first) for a film or user.
    async fn fetch_histogram(&self, subject: &HistogramSubject) -> ClientResult<Vec<u64>>;

    /// Details from a film's main page.
    async fn fetch_film(&self, slug: &str) -> ClientResult<FilmDetails>;

    /// Profile counters for a user.
    async fn fetch_profile(&self, username: &str) -> ClientResult<ProfileStats>;

    /// List metadata (entries are paginated through [`fetch_films`](Self::fetch_films)).
    async fn fetch_list(&self, list: &ListRef) -> ClientResult<ListDetails>;

    /// Names and slugs for a set of films.
    async fn describe_films(&self, ids: &[FilmId]) -> ClientResult<Vec<FilmSummary>>;

    /// Save every attribute of a list (creates it when `list_id` is `None`).
    async fn submit_list_update(&self, request: &ListUpdateRequest) -> ClientResult<()>;

    /// Delete a list owned by the session user.
    async fn delete_list(&self, list_id: u64) -> ClientResult<()>;

    /// Comments currently visible on a list.
    async fn fetch_comments(&self, list_id: u64) -> ClientResult<Vec<Comment>>;

    /// Post a comment on a list.
    async fn submit_comment(&self, list_id: u64, text: &str) -> ClientResult<()>;

    /// Remove a comment.
    async fn delete_comment(&self, comment_id: u64) -> ClientResult<()>;

    /// Name shown on a user's profile (free accounts may differ from the username).
    async fn resolve_display_name(&self, username: &str) -> ClientResult<String>;
}
