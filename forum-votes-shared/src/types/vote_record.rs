use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::{ItemType, VoteType};

/// Identifies the single vote a user may hold on an item.
///
/// There is at most one vote record per key; the key is what makes a
/// repeated vote overwrite or retract the previous one instead of adding
/// a second record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteKey {
    pub user_id: String,
    pub item_id: String,
}

impl VoteKey {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
        }
    }

    /// Deterministic document id used by document stores (`{user}_{item}`).
    pub fn document_id(&self) -> String {
        format!("{}_{}", self.user_id, self.item_id)
    }
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document_id())
    }
}

/// Represents a user's current vote on a post or an answer.
///
/// `post_id` references the parent post and is always set for answers,
/// since the answer's counters live under its post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub user_id: String,
    pub item_id: String,
    pub item_type: ItemType,
    pub post_id: Option<String>,
    pub vote_type: VoteType,
    pub voted_at: u64,
}

impl VoteRecord {
    pub fn key(&self) -> VoteKey {
        VoteKey::new(self.user_id.clone(), self.item_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_composite() {
        let key = VoteKey::new("bob", "post-1");
        assert_eq!(key.document_id(), "bob_post-1");
        assert_eq!(key.to_string(), "bob_post-1");
    }

    #[test]
    fn test_record_key() {
        let record = VoteRecord {
            user_id: "bob".to_string(),
            item_id: "answer-9".to_string(),
            item_type: ItemType::Answer,
            post_id: Some("post-1".to_string()),
            vote_type: VoteType::Helpful,
            voted_at: 1713859200,
        };
        assert_eq!(record.key(), VoteKey::new("bob", "answer-9"));
    }
}
