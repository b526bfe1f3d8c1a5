//! Typed errors for the film catalog library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on what went wrong.

use thiserror::Error;

/// Errors that can occur while collecting, aggregating or editing catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A histogram did not have exactly ten half-star buckets
    #[error("malformed rating histogram: expected 10 buckets, got {buckets}")]
    MalformedHistogram { buckets: usize },

    /// A page fetch failed part way through a collection run
    #[error("collection aborted at page {page}: {source}")]
    CollectionAborted {
        page: u32,
        #[source]
        source: ClientError,
    },

    /// An argument was out of range or unknown to the site
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Entries changed but no change summary could be rendered
    #[error("entries changed ({added} added, {removed} removed) but no change summary was produced")]
    DiffComputation { added: usize, removed: usize },

    /// Collaborator call failed outside of a collection run
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    /// Shorthand for [`CatalogError::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors reported by the session collaborator.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The site answered with an error payload
    #[error("site error: {message}")]
    Site { message: String },

    /// Credentials were rejected
    #[error("login failed: {message}")]
    Login { message: String },

    /// Resource does not exist
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Response could not be turned into a typed result
    #[error("could not parse {resource}: {reason}")]
    Parse { resource: String, reason: String },
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for collaborator calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
