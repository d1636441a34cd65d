mod audit;
mod changeset;
mod forum;
mod item;
mod reputation;
mod viewer;
mod vote_record;
mod vote_type;
mod votes_count;

pub use audit::{ItemTally, RepairPlan};
pub use changeset::{RecordWrite, VoteChangeset};
pub use forum::{DeletionSummary, ForumAnswer, ForumPost, PostQuery, PostSort};
pub use item::{ItemRef, VotableItem};
pub use reputation::AuthorReputation;
pub use viewer::Viewer;
pub use vote_record::{VoteKey, VoteRecord};
pub use vote_type::{ItemType, ParseTypeError, VoteType};
pub use votes_count::{VoteDelta, VotesCount};
