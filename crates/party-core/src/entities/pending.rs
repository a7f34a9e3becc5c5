//! Pending records awaiting an explicit host decision

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{ItemId, MemberId, OutcomeKind};

/// A threshold crossing captured under host-approval mode
///
/// Created when a vote threshold is crossed while approval mode is active;
/// destroyed on explicit approve or reject. At most one record exists per
/// (item, kind) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVoteOutcome {
    pub id: Uuid,
    pub item_id: ItemId,
    pub kind: OutcomeKind,
    /// Threshold value at the moment the crossing was detected
    pub threshold: usize,
    pub created_at: DateTime<Utc>,
}

impl PendingVoteOutcome {
    pub fn new(item_id: ItemId, kind: OutcomeKind, threshold: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            kind,
            threshold,
            created_at: Utc::now(),
        }
    }
}

/// A guest's request to skip a queued item
///
/// Duplicate requests for the same (item, member) pair while one is pending
/// are ignored at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSkipRequest {
    pub id: Uuid,
    pub item_id: ItemId,
    pub requested_by: MemberId,
    pub requested_at: DateTime<Utc>,
}

impl PendingSkipRequest {
    pub fn new(item_id: ItemId, requested_by: MemberId) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            requested_by,
            requested_at: Utc::now(),
        }
    }
}
