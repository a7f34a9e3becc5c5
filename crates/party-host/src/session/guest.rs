//! Guest session controller
//!
//! The client half of the session protocol: a small state machine that
//! tracks the join attempt lifecycle and mirrors host snapshots. Every
//! incoming snapshot is the newest truth - any locally predicted state is
//! discarded wholesale.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use party_core::{GeoPoint, ItemId, MemberId, PartyState, VoteDirection};

use crate::protocol::{JoinPayload, PartyMessage};

/// Where the guest is in the session lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestPhase {
    Idle,
    /// Waiting for a join decision; the attempt id invalidates stale timers
    Joining { attempt: u64 },
    Admitted,
    Rejected { reason: Option<String> },
    Disconnected,
}

/// Last observed playback progress
#[derive(Debug, Clone, PartialEq)]
pub struct PlayheadView {
    pub item_id: Option<ItemId>,
    pub is_playing: bool,
    pub position_seconds: f64,
    pub updated_at: DateTime<Utc>,
}

/// Client state machine, symmetric to the host's session controller
pub struct GuestSessionController {
    member_id: MemberId,
    display_name: String,
    has_playback_account: bool,

    phase: GuestPhase,
    /// Monotonic join attempt counter; timeouts check against it
    attempt_counter: u64,

    party: Option<PartyState>,
    cooldowns: HashMap<ItemId, u64>,
    remaining_action_slots: Option<u32>,
    playhead: Option<PlayheadView>,
}

impl GuestSessionController {
    pub fn new(
        member_id: MemberId,
        display_name: impl Into<String>,
        has_playback_account: bool,
    ) -> Self {
        Self {
            member_id,
            display_name: display_name.into(),
            has_playback_account,
            phase: GuestPhase::Idle,
            attempt_counter: 0,
            party: None,
            cooldowns: HashMap::new(),
            remaining_action_slots: None,
            playhead: None,
        }
    }

    // === Read surface ===

    #[must_use]
    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    #[must_use]
    pub fn phase(&self) -> &GuestPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_admitted(&self) -> bool {
        self.phase == GuestPhase::Admitted
    }

    /// Latest authoritative state copy
    #[must_use]
    pub fn party(&self) -> Option<&PartyState> {
        self.party.as_ref()
    }

    /// Remaining vote cooldown for an item, in seconds
    #[must_use]
    pub fn cooldown_for(&self, item_id: &ItemId) -> Option<u64> {
        self.cooldowns.get(item_id).copied()
    }

    #[must_use]
    pub fn remaining_action_slots(&self) -> Option<u32> {
        self.remaining_action_slots
    }

    #[must_use]
    pub fn playhead(&self) -> Option<&PlayheadView> {
        self.playhead.as_ref()
    }

    // === Join lifecycle ===

    /// Start a join attempt from a scanned QR payload
    ///
    /// Returns the attempt id (for the caller's timeout) and the request to
    /// send. Starting a new attempt invalidates every timer tied to the old
    /// one.
    pub fn begin_join(
        &mut self,
        payload: &JoinPayload,
        location: Option<GeoPoint>,
    ) -> (u64, PartyMessage) {
        self.attempt_counter += 1;
        let attempt = self.attempt_counter;
        self.phase = GuestPhase::Joining { attempt };

        let request = PartyMessage::JoinRequest {
            session_id: payload.session_id.clone(),
            join_code: payload.join_code.clone(),
            member_id: self.member_id.clone(),
            display_name: self.display_name.clone(),
            has_playback_account: self.has_playback_account,
            location,
        };
        (attempt, request)
    }

    /// A join timeout fired; only the current attempt may act
    pub fn join_timed_out(&mut self, attempt: u64) -> bool {
        if self.phase != (GuestPhase::Joining { attempt }) {
            // Stale timer from an abandoned attempt
            return false;
        }
        self.phase = GuestPhase::Rejected {
            reason: Some("join timed out".to_string()),
        };
        true
    }

    /// The link dropped
    pub fn mark_disconnected(&mut self) {
        self.phase = GuestPhase::Disconnected;
    }

    // === Incoming host messages ===

    pub fn handle_message(&mut self, message: PartyMessage) {
        match message {
            PartyMessage::JoinDecision {
                accepted,
                reason,
                member_id,
            } => {
                if member_id != self.member_id {
                    return;
                }
                if !matches!(self.phase, GuestPhase::Joining { .. }) {
                    tracing::debug!("Join decision outside an attempt ignored");
                    return;
                }
                self.phase = if accepted {
                    GuestPhase::Admitted
                } else {
                    GuestPhase::Rejected { reason }
                };
            }
            PartyMessage::StateSnapshot {
                state,
                cooldowns,
                remaining_action_slots,
            } => {
                // Snapshots replace, never merge
                self.party = Some(state);
                self.cooldowns = cooldowns.unwrap_or_default();
                self.remaining_action_slots = remaining_action_slots;
            }
            PartyMessage::NowPlaying {
                item_id,
                is_playing,
                position_seconds,
                ..
            } => {
                self.playhead = Some(PlayheadView {
                    item_id,
                    is_playing,
                    position_seconds,
                    updated_at: Utc::now(),
                });
            }
            PartyMessage::SearchResults { .. } => {
                // Surfaced to the UI layer; nothing to track here
            }
            other => {
                tracing::debug!(kind = other.kind(), "Unexpected message from host dropped");
            }
        }
    }

    // === Outgoing guest messages ===

    /// Build a vote frame; `None` unless admitted
    #[must_use]
    pub fn vote_message(&self, item_id: ItemId, direction: VoteDirection) -> Option<PartyMessage> {
        self.is_admitted()
            .then(|| PartyMessage::vote(self.member_id.clone(), item_id, direction))
    }

    /// Build a skip request frame; `None` unless admitted
    #[must_use]
    pub fn skip_request_message(&self, item_id: ItemId) -> Option<PartyMessage> {
        self.is_admitted()
            .then(|| PartyMessage::skip_request(self.member_id.clone(), item_id))
    }
}
