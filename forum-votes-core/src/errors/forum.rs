//! Error types for the forum service.
use forum_votes_repository::ForumRepositoryError;
use thiserror::Error;

/// Represents errors returned by `ForumService` operations.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Store error: {0}")]
    Store(ForumRepositoryError),
}

impl ForumError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<ForumRepositoryError> for ForumError {
    fn from(err: ForumRepositoryError) -> Self {
        match err {
            ForumRepositoryError::PostNotFound(post_id) => {
                Self::NotFound(format!("post {post_id}"))
            }
            ForumRepositoryError::AnswerNotFound { post_id, answer_id } => {
                Self::NotFound(format!("answer {answer_id} of post {post_id}"))
            }
            other => Self::Store(other),
        }
    }
}
