//! Host commands
//!
//! Everything that can happen to the session funnels through one of these,
//! so the controller task is the only writer of party state. Components
//! never hold references into the state; they send commands and, where a
//! result matters, receive it over a oneshot channel.

use crate::protocol::PartyMessage;
use party_core::{
    ItemId, MemberId, PartyState, PendingSkipRequest, PendingVoteOutcome, QueueItem, TrackSummary,
};
use party_engine::{EngineError, PartySettings};
use tokio::sync::oneshot;
use uuid::Uuid;

/// A command for the session controller task
pub enum HostCommand {
    // === Transport events ===
    /// A frame arrived from a peer
    Incoming {
        conn_id: String,
        message: PartyMessage,
    },
    /// A peer's socket closed
    PeerDisconnected { conn_id: String },
    /// A join decision was delivered; bind the peer for broadcasts
    PeerIdentified {
        conn_id: String,
        member_id: MemberId,
    },

    // === Timers ===
    /// Recurring playback progress tick
    PlaybackTick,
    /// Deferred action-slot restore for an accepted vote
    RestoreSlot {
        member_id: MemberId,
        item_id: ItemId,
    },

    // === Host (admin) operations ===
    /// Seed the queue with the built-in demo library
    LoadDemoLibrary,
    AddTrack {
        track: TrackSummary,
        added_by: Option<MemberId>,
    },
    RemoveItem { item_id: ItemId },
    ReorderUpcoming {
        source_offsets: Vec<usize>,
        destination_offset: usize,
    },
    ApproveOutcome { id: Uuid },
    RejectOutcome { id: Uuid },
    ApproveSkip { id: Uuid },
    RejectSkip { id: Uuid },
    /// Put a recently removed item back at the end of the queue
    RestoreRemoved { item_id: ItemId },
    UpdateSettings {
        settings: PartySettings,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Play,
    Pause,
    SkipCurrent,

    // === Introspection ===
    /// Read the full host view (host UI and tests)
    Query { reply: oneshot::Sender<HostView> },

    /// Stop the controller task
    Shutdown,
}

/// Snapshot of everything the host UI can see
#[derive(Debug, Clone)]
pub struct HostView {
    pub state: PartyState,
    pub settings: PartySettings,
    pub pending_outcomes: Vec<PendingVoteOutcome>,
    pub pending_skips: Vec<PendingSkipRequest>,
    pub recently_removed: Vec<QueueItem>,
}
