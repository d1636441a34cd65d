use crate::types::{ItemRef, VoteDelta, VoteKey, VoteRecord, VoteType};

/// The write applied to a user's vote record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordWrite {
    /// Create the record, or overwrite its vote type.
    Upsert(VoteRecord),
    /// Remove the record (retraction).
    Delete,
}

/// Represents one vote operation to be persisted atomically.
///
/// A `VoteChangeset` bundles the vote record write with the counter delta
/// of the item it targets. `expected` is the record state the changeset was
/// computed from; the store must refuse the changeset if the stored record
/// no longer matches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteChangeset {
    pub key: VoteKey,
    pub item: ItemRef,
    pub expected: Option<VoteType>,
    pub record: RecordWrite,
    pub delta: VoteDelta,
}
