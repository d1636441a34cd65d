use serde::{Deserialize, Serialize};
use crate::types::{ItemType, VotesCount};

/// Locates a votable item in the store.
///
/// Answers are addressed through their parent post, mirroring how answers
/// are nested under posts in the forum collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "itemType", rename_all = "camelCase")]
pub enum ItemRef {
    #[serde(rename_all = "camelCase")]
    Post { post_id: String },
    #[serde(rename_all = "camelCase")]
    Answer { post_id: String, answer_id: String },
}

impl ItemRef {
    pub fn post(post_id: impl Into<String>) -> Self {
        ItemRef::Post { post_id: post_id.into() }
    }

    pub fn answer(post_id: impl Into<String>, answer_id: impl Into<String>) -> Self {
        ItemRef::Answer {
            post_id: post_id.into(),
            answer_id: answer_id.into(),
        }
    }

    pub fn item_id(&self) -> &str {
        match self {
            ItemRef::Post { post_id } => post_id.as_str(),
            ItemRef::Answer { answer_id, .. } => answer_id.as_str(),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            ItemRef::Post { .. } => ItemType::Post,
            ItemRef::Answer { .. } => ItemType::Answer,
        }
    }

    /// The post the item belongs to; for a post this is its own id.
    pub fn post_id(&self) -> &str {
        match self {
            ItemRef::Post { post_id } | ItemRef::Answer { post_id, .. } => post_id.as_str(),
        }
    }

    /// Parent reference stored on vote records: only answers carry one.
    pub fn parent_post_id(&self) -> Option<&str> {
        match self {
            ItemRef::Post { .. } => None,
            ItemRef::Answer { post_id, .. } => Some(post_id.as_str()),
        }
    }
}

/// The vote-relevant view of a post or an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotableItem {
    pub item: ItemRef,
    pub author_id: String,
    pub counts: VotesCount,
}
