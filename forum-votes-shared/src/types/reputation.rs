use serde::{Deserialize, Serialize};

/// Running totals of the votes received by everything a user authored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorReputation {
    pub user_id: String,
    pub total_helpful_votes: i64,
    pub total_not_helpful_votes: i64,
}

impl AuthorReputation {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }
}
