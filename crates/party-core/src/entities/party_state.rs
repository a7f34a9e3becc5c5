//! Party state - the authoritative aggregate the host owns
//!
//! On the host this is assembled by projection from the queue engine and
//! membership list; guests hold read-only copies received via snapshots and
//! must treat every incoming copy as the newest truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ItemId, MemberId, SessionId};

use super::{Member, QueueItem};

/// Full session state as serialized into snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyState {
    pub session_id: SessionId,
    pub host_name: String,
    pub created_at: DateTime<Utc>,
    /// Ordered queue, including already-played items
    pub queue: Vec<QueueItem>,
    /// Identifier of the item at the playback cursor, if any.
    /// Invariant: when `Some`, the id identifies an element of `queue`.
    pub now_playing_item_id: Option<ItemId>,
    /// Admitted guests; the host itself is not a member
    pub members: Vec<Member>,
}

impl PartyState {
    /// Count of currently admitted guests (the voting population)
    #[must_use]
    pub fn guest_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_admitted).count()
    }

    /// Look up a queue item by identifier
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&QueueItem> {
        self.queue.iter().find(|i| &i.id == id)
    }

    /// Look up a member by identifier
    #[must_use]
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    /// The item currently at the cursor
    #[must_use]
    pub fn now_playing(&self) -> Option<&QueueItem> {
        self.now_playing_item_id.as_ref().and_then(|id| self.item(id))
    }
}
