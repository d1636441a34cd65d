//! # Forum Votes Repository
//! This crate provides traits and implementations for the forum data store.
//! It includes definitions for errors, interfaces, a PostgreSQL implementation
//! backed by `sqlx` transactions, and an in-memory implementation with the same
//! atomicity guarantees for tests and local tooling.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::{CodecError, ForumRepositoryError, VoteRepositoryError};
pub use interfaces::{AuditRepository, ForumRepository, VoteRepository};
pub use memory::MemoryStore;
pub use postgres::{PostgresAuditRepository, PostgresForumRepository, PostgresVoteRepository};
