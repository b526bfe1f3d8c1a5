//! Collection and aggregation pipeline.
//!
//! The pipeline orchestrates:
//! - Paginated collection in bounded batches
//! - Order-stable set algebra over keyed records
//! - Master-list aggregation across many sources
//! - Diffs and generated description blocks

pub mod algebra;
pub mod changes;
pub mod master;
pub mod paginate;

pub use algebra::{difference, duplicate_count, key_set, keys, merge, replace, unique_by_key};
pub use changes::{bold, link, DescriptionRenderer, EntryDiff, CHANGES_HEADING};
pub use master::{MasterList, MasterListOutcome};
pub use paginate::Paginator;
