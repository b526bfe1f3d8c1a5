//! Site services built on a [`CatalogClient`](crate::traits::client::CatalogClient).
//!
//! - Film search by sort order, period, genre, country and language
//! - A member's rated films, network and rating profile
//! - Single-film details and rating labels
//! - Reading lists and editing the session user's own
//! - Master-list sources backed by lists, people, studios and ratings

pub mod film;
pub mod list;
pub mod network;
pub mod rated;
pub mod search;
pub mod sources;

pub use film::{film_slug, FilmInfo};
pub use list::{load_snapshot, CatalogList, OwnedList};
pub use network::UserNetwork;
pub use rated::{encode_rating, RatedQuery, RatedSelection, UserRated, RATED_SORT_ORDERS};
pub use search::{FilmSearch, Popularity, SearchParams};
pub use sources::{ChildList, Individual, Role, Studio, UserRatings};
