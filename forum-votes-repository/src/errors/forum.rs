//! Error types for the forum repository.
use thiserror::Error;
use crate::errors::CodecError;

/// Represents errors that can occur while storing or loading posts and answers.
#[derive(Debug, Error)]
pub enum ForumRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Answer {answer_id} not found under post {post_id}")]
    AnswerNotFound { post_id: String, answer_id: String },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}
