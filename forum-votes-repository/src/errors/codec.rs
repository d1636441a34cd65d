use thiserror::Error;

/// Errors raised while mapping stored column values to domain types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Invalid vote type: {0}")]
    InvalidVoteType(i16),

    #[error("Invalid item type: {0}")]
    InvalidItemType(i16),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(u64),

    #[error("Answer vote without parent post: {0}")]
    MissingParentPost(String),
}
