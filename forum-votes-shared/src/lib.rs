//! # Forum Votes Shared
//! This crate defines the data structures shared across the forum votes crates.
//! It includes vote and item identifiers, vote records, counters, forum posts
//! and answers, author reputation, audit tallies and vote changesets.
pub mod types;
