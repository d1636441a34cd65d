use crate::types::{ItemRef, VoteKey, VotesCount};

/// Stored counters of an item next to the counts derived from its vote records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTally {
    pub item: ItemRef,
    pub author_id: String,
    pub stored: VotesCount,
    pub recounted: VotesCount,
}

impl ItemTally {
    pub fn has_drift(&self) -> bool {
        self.stored != self.recounted
    }
}

/// Corrections applied by a counter audit in a single transaction.
///
/// Counters of `items` are recomputed from their vote records while the
/// repair holds the item, never copied from an earlier tally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairPlan {
    pub items: Vec<ItemRef>,
    pub orphans: Vec<VoteKey>,
}
