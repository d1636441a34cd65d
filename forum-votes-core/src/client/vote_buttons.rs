//! State machine behind a pair of Helpful / Not Helpful buttons.
//!
//! The state applies a vote optimistically with the same toggle rule as
//! the aggregator, keeps a snapshot, and on settlement either adopts the
//! committed counters or restores the snapshot exactly.
use forum_votes_shared::types::{ItemRef, ItemType, Viewer, VoteType, VotesCount};
use thiserror::Error;
use crate::aggregator::{CastVote, VoteOutcome, plan_transition};
use crate::errors::VoteError;

/// Which controls a viewer gets for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteControls {
    /// The viewer wrote the item and only sees its stats.
    ReadOnly,
    /// Nobody is signed in; clicking asks for a login.
    LoginRequired,
    Interactive,
}

/// Why a click was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BeginError {
    #[error("a vote is already being submitted")]
    InFlight,
    #[error("the current vote is still loading")]
    Loading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    helpful: i64,
    not_helpful: i64,
    current_vote: Option<VoteType>,
}

/// A vote applied optimistically and waiting for the server's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVote {
    pub requested: VoteType,
    snapshot: Snapshot,
}

impl PendingVote {
    /// The vote the viewer held before clicking, sent as the request's current vote.
    pub fn previous_vote(&self) -> Option<VoteType> {
        self.snapshot.current_vote
    }

    /// Builds the request to submit for this click.
    pub fn request(&self, viewer: &Viewer, item: &ItemRef, author_id: Option<&str>) -> CastVote {
        CastVote {
            user_id: viewer.user_id.clone(),
            item_id: item.item_id().to_string(),
            item_type: item.item_type(),
            requested_vote: self.requested,
            current_vote: self.previous_vote(),
            author_id: author_id.map(str::to_string),
            parent_post_id: item.parent_post_id().map(str::to_string),
        }
    }
}

/// Helpfulness figures shown to an item's author.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelpfulnessStats {
    pub helpful: i64,
    pub total: i64,
    pub percentage: f64,
}

impl HelpfulnessStats {
    pub fn summary(&self, item_type: ItemType) -> String {
        match self.total {
            0 => format!("No votes yet (this is your {item_type})."),
            1 => format!("{} of 1 user found this helpful.", self.helpful),
            total => format!("{} of {total} users found this helpful.", self.helpful),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteButtonState {
    pub helpful: i64,
    pub not_helpful: i64,
    pub current_vote: Option<VoteType>,
    pub in_flight: bool,
    /// Set until the viewer's stored vote has been fetched.
    pub loading: bool,
}

impl VoteButtonState {
    /// Starts from the item's counters, with the viewer's vote still loading.
    pub fn new(counts: VotesCount) -> Self {
        Self {
            helpful: counts.helpful,
            not_helpful: counts.not_helpful,
            current_vote: None,
            in_flight: false,
            loading: true,
        }
    }

    /// Records the viewer's stored vote once it is known.
    pub fn finish_loading(&mut self, current_vote: Option<VoteType>) {
        self.current_vote = current_vote;
        self.loading = false;
    }

    pub fn for_viewer(viewer: Option<&Viewer>, author_id: Option<&str>) -> VoteControls {
        match viewer {
            Some(viewer) if author_id == Some(viewer.user_id.as_str()) => VoteControls::ReadOnly,
            Some(_) => VoteControls::Interactive,
            None => VoteControls::LoginRequired,
        }
    }

    /// Applies `requested` optimistically.
    pub fn begin(&mut self, requested: VoteType) -> Result<PendingVote, BeginError> {
        if self.in_flight {
            return Err(BeginError::InFlight);
        }
        if self.loading {
            return Err(BeginError::Loading);
        }

        let snapshot = Snapshot {
            helpful: self.helpful,
            not_helpful: self.not_helpful,
            current_vote: self.current_vote,
        };
        let plan = plan_transition(self.current_vote, requested);
        let counts = VotesCount::new(self.helpful, self.not_helpful).saturating_apply(plan.delta);

        self.helpful = counts.helpful;
        self.not_helpful = counts.not_helpful;
        self.current_vote = plan.new_vote;
        self.in_flight = true;

        Ok(PendingVote { requested, snapshot })
    }

    /// Settles a pending vote with the aggregator's result.
    ///
    /// Returns the message to show the user when the vote failed.
    pub fn settle(
        &mut self,
        pending: PendingVote,
        result: &Result<VoteOutcome, VoteError>,
    ) -> Option<String> {
        self.in_flight = false;
        match result {
            Ok(outcome) => {
                self.helpful = outcome.counts.helpful;
                self.not_helpful = outcome.counts.not_helpful;
                self.current_vote = outcome.vote;
                None
            }
            Err(err) => {
                self.helpful = pending.snapshot.helpful;
                self.not_helpful = pending.snapshot.not_helpful;
                self.current_vote = pending.snapshot.current_vote;
                Some(err.user_message())
            }
        }
    }

    pub fn stats(&self) -> HelpfulnessStats {
        let counts = VotesCount::new(self.helpful, self.not_helpful);
        HelpfulnessStats {
            helpful: counts.helpful,
            total: counts.total(),
            percentage: counts.helpful_percentage(),
        }
    }
}
