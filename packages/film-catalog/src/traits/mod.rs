//! Core trait abstractions.
//!
//! The session collaborator and the page/entry sources are the seams where
//! applications plug in network, auth and markup parsing.

pub mod client;
pub mod source;
