//! This module defines the `ForumService`, which creates, lists and deletes
//! posts and answers on top of a `ForumRepository`.
use std::sync::Arc;
use forum_votes_repository::ForumRepository;
use forum_votes_shared::types::{
    DeletionSummary, ForumAnswer, ForumPost, PostQuery, Viewer, VotesCount,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use crate::aggregator::unix_now;
use crate::errors::ForumError;

/// Input of `ForumService::create_post`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Viewer,
}

/// Input of `ForumService::create_answer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnswer {
    pub post_id: String,
    pub content: String,
    pub author: Viewer,
}

pub struct ForumService {
    repository: Arc<dyn ForumRepository>,
}

impl ForumService {
    pub fn new(repository: Arc<dyn ForumRepository>) -> Self {
        Self { repository }
    }

    /// Creates a post with zeroed counters and returns its id.
    #[instrument(skip(self, post), fields(author = %post.author.user_id))]
    pub async fn create_post(&self, post: NewPost) -> Result<String, ForumError> {
        let author_id = required(&post.author.user_id, "author")?;
        let title = required(&post.title, "title")?;
        let content = required(&post.content, "content")?;

        let record = ForumPost {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags: normalize_tags(&post.tags),
            author_id: author_id.to_string(),
            author_display_name: post.author.public_name().to_string(),
            counts: VotesCount::default(),
            answer_count: 0,
            created_at: unix_now(),
        };
        self.repository.insert_post(&record).await?;

        info!(post_id = %record.id, tags = ?record.tags, "post created");
        Ok(record.id)
    }

    /// Creates an answer under an existing post and returns its id.
    #[instrument(skip(self, answer), fields(post_id = %answer.post_id, author = %answer.author.user_id))]
    pub async fn create_answer(&self, answer: NewAnswer) -> Result<String, ForumError> {
        let author_id = required(&answer.author.user_id, "author")?;
        let post_id = required(&answer.post_id, "post id")?;
        let content = required(&answer.content, "content")?;

        let record = ForumAnswer {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            content: content.to_string(),
            author_id: author_id.to_string(),
            author_display_name: answer.author.public_name().to_string(),
            counts: VotesCount::default(),
            created_at: unix_now(),
        };
        self.repository.insert_answer(&record).await?;

        info!(answer_id = %record.id, "answer created");
        Ok(record.id)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<ForumPost, ForumError> {
        self.repository
            .get_post(post_id)
            .await?
            .ok_or_else(|| ForumError::NotFound(format!("post {post_id}")))
    }

    pub async fn list_posts(&self, query: &PostQuery) -> Result<Vec<ForumPost>, ForumError> {
        Ok(self.repository.list_posts(query).await?)
    }

    /// Lists a post's answers, newest first.
    pub async fn list_answers(&self, post_id: &str) -> Result<Vec<ForumAnswer>, ForumError> {
        Ok(self.repository.list_answers(post_id).await?)
    }

    pub async fn posts_by_author(&self, author_id: &str) -> Result<Vec<ForumPost>, ForumError> {
        if author_id.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.repository.posts_by_author(author_id).await?)
    }

    /// Deletes an answer written by `viewer`, with its votes.
    #[instrument(skip(self, viewer), fields(viewer = %viewer.user_id))]
    pub async fn delete_answer(
        &self,
        viewer: &Viewer,
        post_id: &str,
        answer_id: &str,
    ) -> Result<DeletionSummary, ForumError> {
        let answer = self
            .repository
            .get_answer(post_id, answer_id)
            .await?
            .ok_or_else(|| ForumError::NotFound(format!("answer {answer_id} of post {post_id}")))?;
        if answer.author_id != viewer.user_id {
            warn!("only the author can delete an answer");
            return Err(ForumError::Forbidden("only the author can delete this answer".to_string()));
        }

        let summary = self.repository.delete_answer(post_id, answer_id).await?;
        info!(votes_removed = summary.votes_removed, "answer deleted");
        Ok(summary)
    }

    /// Deletes a post written by `viewer`, with its answers and all their votes.
    #[instrument(skip(self, viewer), fields(viewer = %viewer.user_id))]
    pub async fn delete_post(
        &self,
        viewer: &Viewer,
        post_id: &str,
    ) -> Result<DeletionSummary, ForumError> {
        let post = self.get_post(post_id).await?;
        if post.author_id != viewer.user_id {
            warn!("only the author can delete a post");
            return Err(ForumError::Forbidden("only the author can delete this post".to_string()));
        }

        let summary = self.repository.delete_post(post_id).await?;
        info!(
            answers_removed = summary.answers_removed,
            votes_removed = summary.votes_removed,
            "post deleted"
        );
        Ok(summary)
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ForumError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ForumError::invalid_input(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Trims and lower-cases tags, dropping empty ones and duplicates.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}
