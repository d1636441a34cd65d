//! This module defines the `ForumRepository` trait for posts and answers.
use forum_votes_shared::types::{DeletionSummary, ForumAnswer, ForumPost, PostQuery};
use crate::errors::ForumRepositoryError;

/// A trait that defines the interface for storing and querying forum content.
///
/// Deletes cascade: removing an answer or a post also removes the vote
/// records of everything deleted and takes their counters out of the
/// authors' reputation, in the same transaction.
#[async_trait::async_trait]
pub trait ForumRepository: Send + Sync {
    /// Inserts a new post.
    async fn insert_post(&self, post: &ForumPost) -> Result<(), ForumRepositoryError>;

    /// Inserts an answer and increments its post's answer count atomically.
    ///
    /// Returns `ForumRepositoryError::PostNotFound` when the parent post is missing.
    async fn insert_answer(&self, answer: &ForumAnswer) -> Result<(), ForumRepositoryError>;

    async fn get_post(&self, post_id: &str) -> Result<Option<ForumPost>, ForumRepositoryError>;

    async fn get_answer(
        &self,
        post_id: &str,
        answer_id: &str,
    ) -> Result<Option<ForumAnswer>, ForumRepositoryError>;

    /// Lists posts in descending order of the query's sort key.
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<ForumPost>, ForumRepositoryError>;

    /// Lists the answers of a post, newest first.
    async fn list_answers(&self, post_id: &str) -> Result<Vec<ForumAnswer>, ForumRepositoryError>;

    /// Lists the posts written by `author_id`, newest first.
    async fn posts_by_author(&self, author_id: &str) -> Result<Vec<ForumPost>, ForumRepositoryError>;

    /// Deletes an answer, its vote records and its reputation contribution.
    async fn delete_answer(
        &self,
        post_id: &str,
        answer_id: &str,
    ) -> Result<DeletionSummary, ForumRepositoryError>;

    /// Deletes a post with all its answers and their vote records.
    async fn delete_post(&self, post_id: &str) -> Result<DeletionSummary, ForumRepositoryError>;
}
