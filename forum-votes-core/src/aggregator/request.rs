use forum_votes_shared::types::{ItemRef, ItemType, VoteType};
use serde::{Deserialize, Serialize};
use crate::errors::VoteError;

/// A request to cast, switch or retract a vote.
///
/// `current_vote` is what the caller believes the user's vote to be. It is
/// informational only: the stored vote record decides the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVote {
    pub user_id: String,
    pub item_id: String,
    pub item_type: ItemType,
    pub requested_vote: VoteType,
    #[serde(default)]
    pub current_vote: Option<VoteType>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub parent_post_id: Option<String>,
}

impl CastVote {
    pub fn post(user_id: impl Into<String>, post_id: impl Into<String>, vote: VoteType) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: post_id.into(),
            item_type: ItemType::Post,
            requested_vote: vote,
            current_vote: None,
            author_id: None,
            parent_post_id: None,
        }
    }

    pub fn answer(
        user_id: impl Into<String>,
        post_id: impl Into<String>,
        answer_id: impl Into<String>,
        vote: VoteType,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: answer_id.into(),
            item_type: ItemType::Answer,
            requested_vote: vote,
            current_vote: None,
            author_id: None,
            parent_post_id: Some(post_id.into()),
        }
    }

    /// Builds a request from the raw strings a client submits.
    ///
    /// Unknown item or vote types are rejected as `VoteError::InvalidArgument`.
    pub fn from_raw(
        user_id: &str,
        item_id: &str,
        item_type: &str,
        requested_vote: &str,
        current_vote: Option<&str>,
        author_id: Option<&str>,
        parent_post_id: Option<&str>,
    ) -> Result<Self, VoteError> {
        Ok(Self {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            item_type: item_type.parse()?,
            requested_vote: requested_vote.parse()?,
            current_vote: current_vote.map(str::parse).transpose()?,
            author_id: author_id.map(str::to_string),
            parent_post_id: parent_post_id.map(str::to_string),
        })
    }

    pub fn with_current_vote(mut self, current_vote: Option<VoteType>) -> Self {
        self.current_vote = current_vote;
        self
    }

    pub fn with_author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    /// Checks the required fields and resolves the item the vote targets.
    pub fn validate(&self) -> Result<ItemRef, VoteError> {
        if self.user_id.trim().is_empty() {
            return Err(VoteError::invalid_argument("user id is required to cast a vote"));
        }
        if self.item_id.trim().is_empty() {
            return Err(VoteError::invalid_argument("item id is required to cast a vote"));
        }
        match self.item_type {
            ItemType::Post => Ok(ItemRef::post(self.item_id.clone())),
            ItemType::Answer => match self.parent_post_id.as_deref().map(str::trim) {
                Some(post_id) if !post_id.is_empty() => {
                    Ok(ItemRef::answer(post_id, self.item_id.clone()))
                }
                _ => Err(VoteError::invalid_argument("parent post id missing for answer vote")),
            },
        }
    }

    /// Whether the caller-supplied author is the voter.
    pub(crate) fn votes_on_own_item(&self) -> bool {
        self.author_id.as_deref() == Some(self.user_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_post_vote() {
        let request = CastVote::post("bob", "p1", VoteType::Helpful);
        assert_eq!(request.validate().unwrap(), ItemRef::post("p1"));
    }

    #[test]
    fn test_validate_rejects_missing_ids() {
        let request = CastVote::post("", "p1", VoteType::Helpful);
        assert!(matches!(request.validate(), Err(VoteError::InvalidArgument(_))));

        let request = CastVote::post("bob", "  ", VoteType::Helpful);
        assert!(matches!(request.validate(), Err(VoteError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_answer_needs_parent() {
        let mut request = CastVote::answer("bob", "p1", "a1", VoteType::NotHelpful);
        assert_eq!(request.validate().unwrap(), ItemRef::answer("p1", "a1"));

        request.parent_post_id = None;
        assert_eq!(
            request.validate(),
            Err(VoteError::invalid_argument("parent post id missing for answer vote"))
        );
    }

    #[test]
    fn test_from_raw_rejects_unknown_types() {
        let err = CastVote::from_raw("bob", "p1", "comment", "helpful", None, None, None).unwrap_err();
        assert!(matches!(err, VoteError::InvalidArgument(_)));

        let err = CastVote::from_raw("bob", "p1", "post", "love", None, None, None).unwrap_err();
        assert!(matches!(err, VoteError::InvalidArgument(_)));

        let request =
            CastVote::from_raw("bob", "a1", "answer", "notHelpful", Some("helpful"), Some("carol"), Some("p1"))
                .unwrap();
        assert_eq!(request.current_vote, Some(VoteType::Helpful));
        assert_eq!(request.author_id.as_deref(), Some("carol"));
    }

    #[test]
    fn test_deserialize_client_payload() {
        let request: CastVote = serde_json::from_str(
            r#"{"userId":"bob","itemId":"p1","itemType":"post","requestedVote":"notHelpful"}"#,
        )
        .unwrap();
        assert_eq!(request, CastVote::post("bob", "p1", VoteType::NotHelpful));
    }
}
