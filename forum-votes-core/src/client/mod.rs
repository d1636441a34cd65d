//! Client-side state of the vote buttons.
mod vote_buttons;

pub use vote_buttons::{BeginError, HelpfulnessStats, PendingVote, VoteButtonState, VoteControls};
