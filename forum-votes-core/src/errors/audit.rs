//! Error types for the counter audit.
use forum_votes_repository::VoteRepositoryError;
use thiserror::Error;

/// Represents errors that can occur while auditing or repairing counters.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit repository error: {0}")]
    Repository(#[from] VoteRepositoryError),
}
