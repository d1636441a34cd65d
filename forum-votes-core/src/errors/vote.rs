//! Error types for vote aggregation.
use forum_votes_repository::VoteRepositoryError;
use forum_votes_shared::types::{ItemType, ParseTypeError};
use thiserror::Error;

/// Message shown to a user when a vote fails for reasons they cannot fix.
pub const RETRY_LATER_MESSAGE: &str = "Failed to submit vote. Please try again.";

/// Represents errors returned by `VoteAggregator` operations.
///
/// Only `TransientStoreFailure` is worth retrying; the other variants
/// describe requests that will fail the same way again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("You cannot vote on your own {item_type}.")]
    SelfVoteRejected { item_type: ItemType },

    #[error("{item_type} not found: {item_id}")]
    ItemNotFound { item_type: ItemType, item_id: String },

    #[error("Transient store failure: {0}")]
    TransientStoreFailure(String),
}

impl VoteError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStoreFailure(_))
    }

    /// Text suitable for a toast next to the vote buttons.
    pub fn user_message(&self) -> String {
        match self {
            Self::TransientStoreFailure(_) => RETRY_LATER_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<VoteRepositoryError> for VoteError {
    fn from(err: VoteRepositoryError) -> Self {
        match err {
            VoteRepositoryError::ItemNotFound { item_type, item_id } => {
                Self::ItemNotFound { item_type, item_id }
            }
            VoteRepositoryError::Conflict { key } => {
                Self::TransientStoreFailure(format!("vote {key} kept changing concurrently"))
            }
            other => Self::TransientStoreFailure(other.to_string()),
        }
    }
}

impl From<ParseTypeError> for VoteError {
    fn from(err: ParseTypeError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_votes_shared::types::VoteKey;

    #[test]
    fn test_self_vote_message_names_item_type() {
        let err = VoteError::SelfVoteRejected { item_type: ItemType::Answer };
        assert_eq!(err.user_message(), "You cannot vote on your own answer.");
    }

    #[test]
    fn test_repository_errors_map_to_taxonomy() {
        let err: VoteError = VoteRepositoryError::conflict(&VoteKey::new("bob", "p1")).into();
        assert!(err.is_transient());
        assert_eq!(err.user_message(), RETRY_LATER_MESSAGE);

        let err: VoteError = VoteRepositoryError::Unavailable("down".to_string()).into();
        assert!(err.is_transient());

        let err: VoteError = VoteRepositoryError::ItemNotFound {
            item_type: ItemType::Post,
            item_id: "p1".to_string(),
        }
        .into();
        assert_eq!(
            err,
            VoteError::ItemNotFound { item_type: ItemType::Post, item_id: "p1".to_string() }
        );
    }
}
