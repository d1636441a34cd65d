//! Error types for the forum votes service.
//! Consolidates the errors of configuration, database setup and the counter audit.
use forum_votes_core::errors::AuditError;
use forum_votes_repository::{ForumRepositoryError, VoteRepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Vote repository error: {0}")]
    VoteRepository(#[from] VoteRepositoryError),
    #[error("Forum repository error: {0}")]
    ForumRepository(#[from] ForumRepositoryError),
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),
}

impl ServiceError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
