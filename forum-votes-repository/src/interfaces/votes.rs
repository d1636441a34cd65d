//! This module defines the `VoteRepository` trait, which provides an interface
//! for reading vote records and item counters, and for persisting vote
//! changesets atomically.
use forum_votes_shared::types::{
    AuthorReputation, ItemRef, VotableItem, VoteChangeset, VoteKey, VoteRecord, VotesCount,
};
use crate::errors::VoteRepositoryError;

/// A trait that defines the interface for interacting with votes and counters.
///
/// Implementors must apply `persist_changeset` as a single atomic unit: the
/// vote record write, the item counter update and the author reputation
/// update either all land or none do.
#[async_trait::async_trait]
pub trait VoteRepository: Send + Sync {
    /// Fetches the vote record stored under `key`, if any.
    async fn get_user_vote(
        &self,
        key: &VoteKey,
    ) -> Result<Option<VoteRecord>, VoteRepositoryError>;

    /// Fetches the author and counters of a post or an answer.
    async fn get_item(
        &self,
        item: &ItemRef,
    ) -> Result<Option<VotableItem>, VoteRepositoryError>;

    /// Fetches the reputation totals of an author; zero when nothing was recorded yet.
    async fn get_author_reputation(
        &self,
        user_id: &str,
    ) -> Result<AuthorReputation, VoteRepositoryError>;

    /// Persists a `VoteChangeset` in a single transaction.
    ///
    /// # Arguments
    ///
    /// * `changeset` - The record write and counter delta of one vote operation.
    ///
    /// # Returns
    ///
    /// * `Ok(VotesCount)` - The item's counters after the commit
    /// * `Err(VoteRepositoryError::Conflict)` - The stored record no longer matches `changeset.expected`
    /// * `Err(VoteRepositoryError::ItemNotFound)` - The target item does not exist
    /// * `Err(VoteRepositoryError)` - Any other store failure; nothing was written
    async fn persist_changeset(
        &self,
        changeset: &VoteChangeset,
    ) -> Result<VotesCount, VoteRepositoryError>;
}
