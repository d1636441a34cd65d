//! Error types for the vote repository.
//! Defines specific errors that can occur while reading or persisting votes.
use forum_votes_shared::types::{ItemRef, ItemType, VoteKey};
use thiserror::Error;
use crate::errors::CodecError;

/// Represents errors that can occur within the vote and audit repositories.
#[derive(Debug, Error)]
pub enum VoteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The stored vote record no longer matches the state a changeset was computed from.
    #[error("Vote record {key} changed concurrently")]
    Conflict { key: VoteKey },

    #[error("{item_type} not found: {item_id}")]
    ItemNotFound { item_type: ItemType, item_id: String },

    #[error("Counter would go negative for item {0}")]
    CounterUnderflow(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

impl VoteRepositoryError {
    pub fn conflict(key: &VoteKey) -> Self {
        Self::Conflict { key: key.clone() }
    }

    pub fn item_not_found(item: &ItemRef) -> Self {
        Self::ItemNotFound {
            item_type: item.item_type(),
            item_id: item.item_id().to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
