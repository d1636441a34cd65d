//! Error types of the forum votes core.
mod audit;
mod forum;
mod vote;

pub use audit::AuditError;
pub use forum::ForumError;
pub use vote::{RETRY_LATER_MESSAGE, VoteError};
