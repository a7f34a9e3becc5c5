//! Vote directions and queue-structural outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a guest vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Structural consequence of a crossed vote threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeKind {
    /// Move the item to the slot immediately after now-playing
    PromoteBehindCurrent,
    /// Evict the item from the queue
    Remove,
    /// Move an already-played item back to the end of the queue
    SendToEnd,
}

impl OutcomeKind {
    /// The toggle bit controlling this outcome kind
    #[must_use]
    pub const fn flag(self) -> OutcomeKinds {
        match self {
            Self::PromoteBehindCurrent => OutcomeKinds::PROMOTE_BEHIND_CURRENT,
            Self::Remove => OutcomeKinds::REMOVE,
            Self::SendToEnd => OutcomeKinds::SEND_TO_END,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PromoteBehindCurrent => write!(f, "promote-behind-current"),
            Self::Remove => write!(f, "remove"),
            Self::SendToEnd => write!(f, "send-to-end"),
        }
    }
}

bitflags::bitflags! {
    /// Per-kind enable toggles; a cleared bit means the kind never triggers
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutcomeKinds: u8 {
        const PROMOTE_BEHIND_CURRENT = 1 << 0;
        const REMOVE                 = 1 << 1;
        const SEND_TO_END            = 1 << 2;
    }
}

impl OutcomeKinds {
    /// Check whether a given outcome kind is enabled
    #[must_use]
    pub fn allows(&self, kind: OutcomeKind) -> bool {
        self.contains(kind.flag())
    }
}

impl Default for OutcomeKinds {
    fn default() -> Self {
        Self::all()
    }
}
