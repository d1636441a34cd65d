use serde::{Deserialize, Serialize};
use crate::types::VotesCount;

/// A forum question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub author_id: String,
    pub author_display_name: String,
    pub counts: VotesCount,
    pub answer_count: i64,
    pub created_at: u64,
}

/// A reply to a forum post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumAnswer {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author_id: String,
    pub author_display_name: String,
    pub counts: VotesCount,
    pub created_at: u64,
}

/// Ordering of the post listing, always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostSort {
    #[default]
    Newest,
    MostHelpful,
}

/// Filter and ordering of a post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub sort: PostSort,
    pub tag: Option<String>,
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSummary {
    pub answers_removed: u64,
    pub votes_removed: u64,
}
