//! Error types for the forum votes repository.
//! Consolidates and re-exports error types related to repository operations.
mod codec;
mod forum;
mod votes;

pub use codec::CodecError;
pub use forum::ForumRepositoryError;
pub use votes::VoteRepositoryError;
