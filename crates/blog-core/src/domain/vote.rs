use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Direction of a stored vote. A stored vote is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn weight(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

impl From<VoteDirection> for i8 {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

impl TryFrom<i8> for VoteDirection {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteDirection::Up),
            -1 => Ok(VoteDirection::Down),
            other => Err(format!("stored vote must be 1 or -1, got {other}")),
        }
    }
}

/// A vote instruction as submitted by a user.
///
/// `Retract` (0) is never stored: it removes the user's existing vote, and is
/// ignored when the user has not voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ballot {
    Up,
    Down,
    Retract,
}

impl Ballot {
    /// The direction to store, or `None` for a retraction.
    pub fn direction(self) -> Option<VoteDirection> {
        match self {
            Ballot::Up => Some(VoteDirection::Up),
            Ballot::Down => Some(VoteDirection::Down),
            Ballot::Retract => None,
        }
    }
}

impl TryFrom<i64> for Ballot {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Ballot::Up),
            0 => Ok(Ballot::Retract),
            -1 => Ok(Ballot::Down),
            other => Err(DomainError::validation(format!(
                "vote value must be -1, 0 or 1, got {other}"
            ))),
        }
    }
}

/// A single user's vote on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: Uuid,
    pub value: VoteDirection,
}

/// What a ballot did to a post's vote set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    /// First vote from this user.
    Added,
    /// Existing vote flipped to the other direction.
    Changed,
    /// Existing vote re-cast with the same direction.
    Unchanged,
    /// Existing vote removed.
    Retracted,
    /// Retraction from a user with no vote.
    Ignored,
}

impl fmt::Display for VoteChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VoteChange::Added => "added",
            VoteChange::Changed => "changed",
            VoteChange::Unchanged => "unchanged",
            VoteChange::Retracted => "retracted",
            VoteChange::Ignored => "ignored",
        };
        f.write_str(name)
    }
}
