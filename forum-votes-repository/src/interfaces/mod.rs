//! This module defines and re-exports the interfaces of the forum data store.
//! It serves as a central point for accessing traits related to data interaction.
mod audit;
mod forum;
mod votes;

pub use audit::AuditRepository;
pub use forum::ForumRepository;
pub use votes::VoteRepository;
