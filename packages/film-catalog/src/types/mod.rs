//! Data types shared across the collector, statistics and list engines.

pub mod config;
pub mod film;
pub mod list;
pub mod page;
pub mod record;
pub mod search;
