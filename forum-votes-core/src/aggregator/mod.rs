//! This module defines the `VoteAggregator`, which applies the toggle-vote
//! protocol to posts and answers.
//!
//! A vote is planned against the stored vote record and persisted as one
//! changeset guarded by that record's state. When another writer changed
//! the record in between, the changeset is refused and the aggregator
//! re-reads and plans again, a bounded number of times.
mod request;
mod transition;

pub use request::CastVote;
pub use transition::{TransitionPlan, VoteTransition, plan_transition};

use std::sync::Arc;
use forum_votes_repository::{VoteRepository, VoteRepositoryError};
use forum_votes_shared::types::{ItemRef, VoteKey, VoteType, VotesCount};
use serde::Serialize;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, instrument, warn};
use crate::errors::VoteError;

/// Retry settings of the compare-and-set loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Retries after the first attempt when the vote record changed concurrently.
    pub max_retries: usize,
    pub retry_backoff_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff_ms: 10,
        }
    }
}

/// The result of a successful `cast_vote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub transition: VoteTransition,
    /// The user's vote after the operation; `None` after a retraction.
    pub vote: Option<VoteType>,
    /// The item's counters after the commit.
    pub counts: VotesCount,
}

/// Maintains item counters and per-user vote records.
pub struct VoteAggregator {
    repository: Arc<dyn VoteRepository>,
    config: AggregatorConfig,
}

impl VoteAggregator {
    pub fn new(repository: Arc<dyn VoteRepository>, config: AggregatorConfig) -> Self {
        Self { repository, config }
    }

    /// Returns the user's current vote on an item.
    ///
    /// Empty ids yield `Ok(None)` without touching the store.
    #[instrument(skip(self))]
    pub async fn get_user_vote_for_item(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<VoteType>, VoteError> {
        if user_id.trim().is_empty() || item_id.trim().is_empty() {
            warn!("vote lookup called without user id or item id");
            return Ok(None);
        }

        let record = self
            .repository
            .get_user_vote(&VoteKey::new(user_id, item_id))
            .await?;
        Ok(record.map(|record| record.vote_type))
    }

    /// Casts, switches or retracts a vote.
    ///
    /// # Arguments
    ///
    /// * `request` - The voter, the target item and the requested vote
    ///
    /// # Returns
    ///
    /// * `Ok(VoteOutcome)` - The applied transition and the committed counters
    /// * `Err(VoteError::InvalidArgument)` - A required field is missing
    /// * `Err(VoteError::SelfVoteRejected)` - The voter authored the item
    /// * `Err(VoteError::ItemNotFound)` - The item does not exist
    /// * `Err(VoteError::TransientStoreFailure)` - Nothing was written; the call may be repeated
    #[instrument(
        skip(self, request),
        fields(
            user_id = %request.user_id,
            item_id = %request.item_id,
            item_type = %request.item_type,
            requested = %request.requested_vote,
        )
    )]
    pub async fn cast_vote(&self, request: CastVote) -> Result<VoteOutcome, VoteError> {
        let item = request.validate()?;

        if request.votes_on_own_item() {
            warn!("user tried to vote on their own item");
            return Err(VoteError::SelfVoteRejected { item_type: item.item_type() });
        }

        let target = self
            .repository
            .get_item(&item)
            .await?
            .ok_or_else(|| VoteError::ItemNotFound {
                item_type: item.item_type(),
                item_id: item.item_id().to_string(),
            })?;
        if target.author_id == request.user_id {
            warn!("user tried to vote on their own item");
            return Err(VoteError::SelfVoteRejected { item_type: item.item_type() });
        }
        if let Some(claimed) = request.author_id.as_deref() {
            if claimed != target.author_id {
                debug!(claimed, stored = %target.author_id, "caller-supplied author differs from stored author");
            }
        }

        let key = VoteKey::new(request.user_id.as_str(), item.item_id());
        let strategy = FixedInterval::from_millis(self.config.retry_backoff_ms)
            .take(self.config.max_retries);

        let result = RetryIf::spawn(
            strategy,
            || self.attempt(&key, &item, &request),
            |err: &VoteRepositoryError| {
                if err.is_conflict() {
                    debug!(error = %err, "vote record changed concurrently, retrying");
                    true
                } else {
                    false
                }
            },
        )
        .await;

        match result {
            Ok(outcome) => {
                info!(
                    transition = ?outcome.transition,
                    helpful = outcome.counts.helpful,
                    not_helpful = outcome.counts.not_helpful,
                    "vote applied"
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(error = %err, "vote failed");
                Err(err.into())
            }
        }
    }

    /// Reads the stored vote, plans the transition and persists it once.
    async fn attempt(
        &self,
        key: &VoteKey,
        item: &ItemRef,
        request: &CastVote,
    ) -> Result<VoteOutcome, VoteRepositoryError> {
        let stored = self
            .repository
            .get_user_vote(key)
            .await?
            .map(|record| record.vote_type);
        if stored != request.current_vote {
            debug!(
                stored = ?stored,
                reported = ?request.current_vote,
                "client vote state is stale, planning from the stored vote"
            );
        }

        let plan = plan_transition(stored, request.requested_vote);
        let (transition, vote) = (plan.transition, plan.new_vote);
        let changeset = plan.into_changeset(key.clone(), item.clone(), stored, unix_now());
        let counts = self.repository.persist_changeset(&changeset).await?;

        Ok(VoteOutcome { transition, vote, counts })
    }
}

pub(crate) fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
