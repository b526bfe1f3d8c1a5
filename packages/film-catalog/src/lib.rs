//! Film Catalog Library
//!
//! Collection, statistics and list management on top of a film-cataloging
//! site. The library never talks HTTP itself: an authenticated session is
//! injected as a [`CatalogClient`] and every service borrows it.
//!
//! # Design Philosophy
//!
//! - Pages are collected in bounded batches, in page order
//! - Set operations are order-stable and keyed by film id
//! - Rating labels come from a conservative Bayesian estimate, not the raw mean
//! - Every list save resends the full attribute set
//!
//! # Usage
//!
//! ```rust,ignore
//! use film_catalog::{MasterList, MasterListConfig, OwnedList, Studio, ChildList};
//!
//! let master = MasterList::new(MasterListConfig::default())
//!     .with_source(ChildList::new("kasey", "Nightmare List"))
//!     .with_source(Studio::new("A24")?);
//!
//! let mut list = OwnedList::load(&client, "Everything Scary").await?;
//! let outcome = list.master_update(&master).await?;
//! println!("{} films, {} added", outcome.entries.len(), outcome.diff.added.len());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (CatalogClient, PageSource, EntrySource)
//! - [`types`] - Records, pages, lists, search vocabulary and configuration
//! - [`stats`] - Rating histograms, Bayesian estimates and labels
//! - [`pipeline`] - Paginated collection, set algebra and master lists
//! - [`catalog`] - Search, rated films, networks, films and lists
//! - [`testing`] - Mock implementations for testing

pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod stats;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CatalogError, ClientError, ClientResult, Result};
pub use traits::{
    client::CatalogClient,
    source::{EntrySource, FilmPages, MemberPages, PageSource, SourceKind, SourceLabel},
};
pub use types::{
    config::{
        CollectRequest, MasterListConfig, PaginationConfig, RatingConfig, LIST_PAGE_SIZE,
        MEMBER_PAGE_SIZE, RATED_PAGE_SIZE, SEARCH_PAGE_SIZE,
    },
    film::{FilmDetails, FilmSummary, HistogramSubject, ProfileStats},
    list::{Comment, ListDetails, ListOverrides, ListRef, ListSnapshot, ListUpdateRequest, NewList},
    page::{PageRequest, PageResult},
    record::{FilmId, FilmRecord, Keyed, Member},
    search::SearchOptions,
};

// Re-export statistics
pub use stats::{Classification, RatingClassifier, RatingHistogram};

// Re-export pipeline components
pub use pipeline::{
    difference, duplicate_count, merge, replace, unique_by_key, DescriptionRenderer, EntryDiff,
    MasterList, MasterListOutcome, Paginator,
};

// Re-export catalog services
pub use catalog::{
    film_slug, CatalogList, ChildList, FilmInfo, FilmSearch, Individual, OwnedList, Popularity,
    RatedQuery, RatedSelection, Role, SearchParams, Studio, UserNetwork, UserRated, UserRatings,
};
