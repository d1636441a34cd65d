//! # Forum Votes Core
//! This crate implements the forum's voting and content logic on top of the
//! repository traits.
//! It includes the vote aggregator, the forum service, the client-side vote
//! button state, the counter audit, and their error types.
pub mod aggregator;
pub mod audit;
pub mod client;
pub mod forum;

pub mod errors;

pub use aggregator::{AggregatorConfig, CastVote, VoteAggregator, VoteOutcome, VoteTransition};
pub use audit::{AuditReport, CounterAuditor};
pub use forum::{ForumService, NewAnswer, NewPost};
