//! Queue item entity - one track in the party queue with its vote sets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::value_objects::{ItemId, MemberId, VoteDirection};

/// One entry in the ordered party queue
///
/// Invariant: a member appears in at most one of the two vote sets at a
/// time. The sets are cleared whenever an outcome relocates the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: ItemId,
    pub track: super::TrackSummary,
    pub added_by: MemberId,
    pub added_at: DateTime<Utc>,
    pub up_votes: BTreeSet<MemberId>,
    pub down_votes: BTreeSet<MemberId>,
}

impl QueueItem {
    /// Create a fresh queue item; the identifier is never reused
    pub fn new(track: super::TrackSummary, added_by: MemberId) -> Self {
        Self {
            id: ItemId::generate(),
            track,
            added_by,
            added_at: Utc::now(),
            up_votes: BTreeSet::new(),
            down_votes: BTreeSet::new(),
        }
    }

    /// Record a member's decision, replacing any prior footprint
    ///
    /// A member switching direction is removed from the opposite set first;
    /// the two sets can never both contain the same member.
    pub fn record_vote(&mut self, member: &MemberId, direction: VoteDirection) {
        self.up_votes.remove(member);
        self.down_votes.remove(member);
        match direction {
            VoteDirection::Up => self.up_votes.insert(member.clone()),
            VoteDirection::Down => self.down_votes.insert(member.clone()),
        };
    }

    /// Clear both vote sets (done when an outcome relocates the item)
    pub fn clear_votes(&mut self) {
        self.up_votes.clear();
        self.down_votes.clear();
    }

    #[must_use]
    pub fn up_count(&self) -> usize {
        self.up_votes.len()
    }

    #[must_use]
    pub fn down_count(&self) -> usize {
        self.down_votes.len()
    }
}
