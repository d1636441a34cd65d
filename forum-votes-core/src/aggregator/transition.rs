//! Toggle rule of a vote: what a request does given the stored vote.
use forum_votes_shared::types::{
    ItemRef, RecordWrite, VoteChangeset, VoteDelta, VoteKey, VoteRecord, VoteType,
};
use serde::Serialize;

/// The effect a vote request had on the user's vote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VoteTransition {
    /// No previous vote; a record was created.
    Cast,
    /// The previous vote was the opposite one and was overwritten.
    Changed { from: VoteType },
    /// The same vote was repeated and withdrawn.
    Retracted,
}

/// The outcome of planning a vote request against a known stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub transition: VoteTransition,
    /// The user's vote after the transition.
    pub new_vote: Option<VoteType>,
    pub delta: VoteDelta,
}

/// Applies the toggle rule.
///
/// Repeating the stored vote retracts it, requesting the opposite vote
/// switches it, and voting with nothing stored casts a new vote.
pub fn plan_transition(stored: Option<VoteType>, requested: VoteType) -> TransitionPlan {
    match stored {
        Some(current) if current == requested => TransitionPlan {
            transition: VoteTransition::Retracted,
            new_vote: None,
            delta: VoteDelta::decrement(requested),
        },
        Some(current) => TransitionPlan {
            transition: VoteTransition::Changed { from: current },
            new_vote: Some(requested),
            delta: VoteDelta::increment(requested).combine(VoteDelta::decrement(current)),
        },
        None => TransitionPlan {
            transition: VoteTransition::Cast,
            new_vote: Some(requested),
            delta: VoteDelta::increment(requested),
        },
    }
}

impl TransitionPlan {
    /// Builds the changeset that persists this plan, guarded by the stored state it was planned from.
    pub fn into_changeset(
        self,
        key: VoteKey,
        item: ItemRef,
        expected: Option<VoteType>,
        voted_at: u64,
    ) -> VoteChangeset {
        let record = match self.new_vote {
            Some(vote_type) => RecordWrite::Upsert(VoteRecord {
                user_id: key.user_id.clone(),
                item_id: key.item_id.clone(),
                item_type: item.item_type(),
                post_id: item.parent_post_id().map(str::to_string),
                vote_type,
                voted_at,
            }),
            None => RecordWrite::Delete,
        };
        VoteChangeset {
            key,
            item,
            expected,
            record,
            delta: self.delta,
        }
    }
}
