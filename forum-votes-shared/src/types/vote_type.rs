use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The feedback a user can leave on a post or an answer.
///
/// Serialized as `"helpful"` / `"notHelpful"`, matching the values the
/// browser client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteType {
    /// The user found the item helpful.
    Helpful,
    /// The user found the item not helpful.
    NotHelpful,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Helpful => "helpful",
            VoteType::NotHelpful => "notHelpful",
        }
    }
}

/// The kind of votable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    Post,
    Answer,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Post => "post",
            ItemType::Answer => "answer",
        }
    }
}

/// Error returned when a vote or item type string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTypeError {
    #[error("Unknown vote type: {0}")]
    UnknownVoteType(String),

    #[error("Unknown item type: {0}")]
    UnknownItemType(String),
}

impl FromStr for VoteType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "helpful" => Ok(VoteType::Helpful),
            "notHelpful" => Ok(VoteType::NotHelpful),
            other => Err(ParseTypeError::UnknownVoteType(other.to_string())),
        }
    }
}

impl FromStr for ItemType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(ItemType::Post),
            "answer" => Ok(ItemType::Answer),
            other => Err(ParseTypeError::UnknownItemType(other.to_string())),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
