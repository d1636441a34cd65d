use forum_votes_shared::types::{ItemTally, RepairPlan, VoteKey};
use crate::errors::VoteRepositoryError;

/// Trait for checking denormalized counters against the vote records they summarize.
#[async_trait::async_trait]
pub trait AuditRepository: Send + Sync {
    /// Returns stored and recounted counters for every post and answer.
    async fn tally_items(&self) -> Result<Vec<ItemTally>, VoteRepositoryError>;

    /// Returns the keys of vote records whose item no longer exists.
    async fn find_orphan_votes(&self) -> Result<Vec<VoteKey>, VoteRepositoryError>;

    /// Overwrites counters, removes orphans and rebuilds author reputation in one transaction.
    async fn apply_repair(&self, plan: &RepairPlan) -> Result<(), VoteRepositoryError>;
}
