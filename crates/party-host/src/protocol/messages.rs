//! Message envelope
//!
//! All frames on the peer link are JSON-encoded `PartyMessage` values,
//! self-describing via the `type` tag. Guests send the request variants;
//! the host sends decisions, snapshots, and playback ticks.

use chrono::{DateTime, Utc};
use party_core::{
    GeoPoint, ItemId, JoinCode, MemberId, PartyState, PlaybackTick, SessionId, TrackSummary,
    VoteDirection,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One frame on the peer link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PartyMessage {
    /// Guest asks to be admitted
    #[serde(rename_all = "camelCase")]
    JoinRequest {
        session_id: SessionId,
        join_code: JoinCode,
        member_id: MemberId,
        display_name: String,
        has_playback_account: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<GeoPoint>,
    },

    /// Host answers a join request
    #[serde(rename_all = "camelCase")]
    JoinDecision {
        accepted: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        member_id: MemberId,
    },

    /// Guest votes on a queue item
    #[serde(rename_all = "camelCase")]
    Vote {
        member_id: MemberId,
        item_id: ItemId,
        direction: VoteDirection,
        timestamp: DateTime<Utc>,
    },

    /// Guest asks the host to skip an item
    #[serde(rename_all = "camelCase")]
    SkipRequest {
        member_id: MemberId,
        item_id: ItemId,
        timestamp: DateTime<Utc>,
    },

    /// Host pushes authoritative state, personalized per recipient
    #[serde(rename_all = "camelCase")]
    StateSnapshot {
        state: PartyState,
        /// Remaining cooldown seconds per item for the recipient
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cooldowns: Option<HashMap<ItemId, u64>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remaining_action_slots: Option<u32>,
    },

    /// Host reports playback progress
    #[serde(rename_all = "camelCase")]
    NowPlaying {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_id: Option<ItemId>,
        is_playing: bool,
        position_seconds: f64,
        sent_at: DateTime<Utc>,
    },

    /// Guest asks the host to search the catalog on its behalf
    #[serde(rename_all = "camelCase")]
    SearchRequest { member_id: MemberId, query: String },

    /// Host returns catalog search results
    #[serde(rename_all = "camelCase")]
    SearchResults { results: Vec<TrackSummary> },

    /// Guest proposes a track for the queue
    #[serde(rename_all = "camelCase")]
    AddSongRequest { member_id: MemberId, track: TrackSummary },
}

impl PartyMessage {
    // === Host messages ===

    /// Positive join decision
    #[must_use]
    pub fn join_accepted(member_id: MemberId) -> Self {
        Self::JoinDecision {
            accepted: true,
            reason: None,
            member_id,
        }
    }

    /// Negative join decision with a human-readable reason
    #[must_use]
    pub fn join_rejected(member_id: MemberId, reason: impl Into<String>) -> Self {
        Self::JoinDecision {
            accepted: false,
            reason: Some(reason.into()),
            member_id,
        }
    }

    /// Personalized snapshot
    #[must_use]
    pub fn snapshot(state: PartyState, cooldowns: HashMap<ItemId, u64>, slots: u32) -> Self {
        Self::StateSnapshot {
            state,
            cooldowns: Some(cooldowns),
            remaining_action_slots: Some(slots),
        }
    }

    /// Snapshot without a personal view (no identified peers connected)
    #[must_use]
    pub fn snapshot_plain(state: PartyState) -> Self {
        Self::StateSnapshot {
            state,
            cooldowns: None,
            remaining_action_slots: None,
        }
    }

    /// Playback progress frame
    #[must_use]
    pub fn now_playing(item_id: Option<ItemId>, tick: &PlaybackTick) -> Self {
        Self::NowPlaying {
            item_id,
            is_playing: tick.is_playing,
            position_seconds: tick.position_seconds,
            sent_at: Utc::now(),
        }
    }

    // === Guest messages ===

    /// Vote frame stamped with the current time
    #[must_use]
    pub fn vote(member_id: MemberId, item_id: ItemId, direction: VoteDirection) -> Self {
        Self::Vote {
            member_id,
            item_id,
            direction,
            timestamp: Utc::now(),
        }
    }

    /// Skip request frame stamped with the current time
    #[must_use]
    pub fn skip_request(member_id: MemberId, item_id: ItemId) -> Self {
        Self::SkipRequest {
            member_id,
            item_id,
            timestamp: Utc::now(),
        }
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Short tag for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRequest { .. } => "joinRequest",
            Self::JoinDecision { .. } => "joinDecision",
            Self::Vote { .. } => "vote",
            Self::SkipRequest { .. } => "skipRequest",
            Self::StateSnapshot { .. } => "stateSnapshot",
            Self::NowPlaying { .. } => "nowPlaying",
            Self::SearchRequest { .. } => "searchRequest",
            Self::SearchResults { .. } => "searchResults",
            Self::AddSongRequest { .. } => "addSongRequest",
        }
    }
}
