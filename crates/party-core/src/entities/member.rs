//! Member entity - a guest device admitted to the party

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::MemberId;

/// A guest admitted to the session
///
/// Members are never deleted, only marked. A device that rejoins keeps its
/// identity: the existing entry is updated in place so the headcount never
/// double-counts a reconnection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
    pub is_admitted: bool,
    /// Whether the device holds a playback-capable account
    pub has_playback_account: bool,
    pub last_seen: DateTime<Utc>,
}

impl Member {
    /// Create a newly admitted member
    pub fn new(id: MemberId, display_name: impl Into<String>, has_playback_account: bool) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            is_admitted: true,
            has_playback_account,
            last_seen: Utc::now(),
        }
    }

    /// Refresh fields on reconnection without creating a new entry
    pub fn touch(&mut self, display_name: impl Into<String>, has_playback_account: bool) {
        self.display_name = display_name.into();
        self.has_playback_account = has_playback_account;
        self.is_admitted = true;
        self.last_seen = Utc::now();
    }

    /// Mark the member as no longer admitted (e.g. kicked), keeping the record
    pub fn revoke(&mut self) {
        self.is_admitted = false;
        self.last_seen = Utc::now();
    }
}
