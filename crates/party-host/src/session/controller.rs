//! Host session controller
//!
//! One spawned task owns the authoritative party state and all engines.
//! Socket tasks, timers, and the host UI communicate with it exclusively
//! through the command channel, so at most one structural mutation is ever
//! in flight. The admission location wait and the deferred slot-restore
//! sleeps are the only long-lived suspensions; both re-enter the loop as
//! commands and no-op safely when the world has moved on.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use party_common::PartyConfig;
use party_core::{
    ItemId, JoinCode, LocationProvider, Member, MemberId, PartyState, PlaybackControl, QueueItem,
    SessionId, TrackSummary, VoteDirection,
};
use party_engine::{
    personal_view, AdmissionController, AdmissionKind, EngineError, JoinRequest, PartySettings,
    QueueEngine, RateLimiter, SkipRequestEngine, VoteResult, VotingEngine,
};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::connection::ConnectionManager;
use crate::protocol::{JoinPayload, PartyMessage};

use super::command::{HostCommand, HostView};

/// Command channel depth; senders briefly queue behind a busy controller
const COMMAND_BUFFER: usize = 256;

/// Playback progress reporting interval
const PLAYBACK_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Cap for the decision-delivery backoff
const DECISION_RETRY_MAX_DELAY: Duration = Duration::from_secs(2);

/// Pseudo member id stamped on host-added queue items
fn host_member_id() -> MemberId {
    MemberId::new("host")
}

/// Cheap handle for talking to a running session controller
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<HostCommand>,
    session_id: SessionId,
    join_code: JoinCode,
}

impl SessionHandle {
    /// Enqueue a command; returns false when the controller is gone
    pub async fn send(&self, command: HostCommand) -> bool {
        if self.cmd_tx.send(command).await.is_err() {
            tracing::warn!("Session controller is no longer running");
            return false;
        }
        true
    }

    /// Read the current host view
    pub async fn query(&self) -> Option<HostView> {
        let (reply, rx) = oneshot::channel();
        if !self.send(HostCommand::Query { reply }).await {
            return None;
        }
        rx.await.ok()
    }

    /// Replace the runtime settings, validated as a whole
    pub async fn update_settings(&self, settings: PartySettings) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        if !self.send(HostCommand::UpdateSettings { settings, reply }).await {
            return Err(EngineError::internal("session controller stopped"));
        }
        rx.await
            .map_err(|_| EngineError::internal("session controller dropped the reply"))?
    }

    /// Stop the controller task
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(HostCommand::Shutdown).await;
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn join_code(&self) -> &JoinCode {
        &self.join_code
    }

    /// The QR payload guests scan to join
    #[must_use]
    pub fn join_payload(&self) -> JoinPayload {
        JoinPayload::new(self.session_id.clone(), self.join_code.clone())
    }
}

/// The single owner of party state
pub struct SessionController {
    session_id: SessionId,
    join_code: JoinCode,
    host_name: String,
    created_at: DateTime<Utc>,

    queue: QueueEngine,
    members: Vec<Member>,
    limiter: RateLimiter,
    voting: VotingEngine,
    skips: SkipRequestEngine,
    settings: PartySettings,
    admission: AdmissionController,

    config: PartyConfig,
    connections: Arc<ConnectionManager>,
    playback: Arc<dyn PlaybackControl>,
    location: Arc<dyn LocationProvider>,

    /// Clone handed to timers and delivery tasks so their results re-enter
    /// the loop as commands
    cmd_tx: mpsc::Sender<HostCommand>,
    cmd_rx: mpsc::Receiver<HostCommand>,

    /// Track id seen on the previous playback tick
    last_track_id: Option<String>,
}

impl SessionController {
    /// Spawn a controller task plus its playback tick timer
    pub fn spawn(
        config: PartyConfig,
        connections: Arc<ConnectionManager>,
        playback: Arc<dyn PlaybackControl>,
        location: Arc<dyn LocationProvider>,
    ) -> SessionHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);

        let session_id = SessionId::generate();
        let join_code = JoinCode::generate();

        let handle = SessionHandle {
            cmd_tx: cmd_tx.clone(),
            session_id: session_id.clone(),
            join_code: join_code.clone(),
        };

        let admission = AdmissionController::new(
            session_id.clone(),
            join_code.clone(),
            config.proximity_radius_m,
            config.location_wait,
        );

        let controller = Self {
            session_id: session_id.clone(),
            join_code,
            host_name: config.host_name.clone(),
            created_at: Utc::now(),
            queue: QueueEngine::new(),
            members: Vec::new(),
            limiter: RateLimiter::new(),
            voting: VotingEngine::new(),
            skips: SkipRequestEngine::new(),
            settings: PartySettings::default(),
            admission,
            config,
            connections,
            playback,
            location,
            cmd_tx: cmd_tx.clone(),
            cmd_rx,
            last_track_id: None,
        };

        tokio::spawn(controller.run());

        // Ticks run on their own timer and never overlap: each one is a
        // run-to-completion command in the loop
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PLAYBACK_TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if cmd_tx.send(HostCommand::PlaybackTick).await.is_err() {
                    break;
                }
            }
        });

        tracing::info!(session_id = %session_id, "Session controller started");
        handle
    }

    async fn run(mut self) {
        while let Some(command) = self.cmd_rx.recv().await {
            if matches!(command, HostCommand::Shutdown) {
                break;
            }
            self.handle_command(command).await;
        }
        tracing::info!(session_id = %self.session_id, "Session controller stopped");
    }

    async fn handle_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::Incoming { conn_id, message } => {
                self.handle_incoming(conn_id, message).await;
            }
            HostCommand::PeerDisconnected { conn_id } => {
                tracing::debug!(conn_id = %conn_id, "Peer disconnected");
            }
            HostCommand::PeerIdentified { conn_id, member_id } => {
                if self.connections.identify(&conn_id, member_id.clone()) {
                    if let Some(member) = self.members.iter_mut().find(|m| m.id == member_id) {
                        member.last_seen = Utc::now();
                    }
                    self.broadcast_snapshots();
                }
            }
            HostCommand::PlaybackTick => self.handle_tick().await,
            HostCommand::RestoreSlot { member_id, item_id } => {
                // Fires after the cooldown window; safe even if the member
                // or item is long gone
                self.limiter.restore_slot(&member_id);
                tracing::trace!(member_id = %member_id, item_id = %item_id, "Action slot restored");
                self.broadcast_snapshots();
            }
            HostCommand::LoadDemoLibrary => self.load_demo_library().await,
            HostCommand::AddTrack { track, added_by } => {
                let added_by = added_by.unwrap_or_else(host_member_id);
                self.add_track(track, added_by).await;
            }
            HostCommand::RemoveItem { item_id } => {
                if self.queue.remove(&item_id).is_some() {
                    self.forget_item(&item_id);
                    self.broadcast_snapshots();
                }
            }
            HostCommand::ReorderUpcoming {
                source_offsets,
                destination_offset,
            } => match self.queue.reorder_upcoming(&source_offsets, destination_offset) {
                Ok(()) => self.broadcast_snapshots(),
                Err(e) => tracing::warn!(error = %e, "Reorder rejected"),
            },
            HostCommand::ApproveOutcome { id } => self.approve_outcome(id),
            HostCommand::RejectOutcome { id } => {
                match self.voting.reject_pending(id) {
                    Ok(record) => {
                        tracing::info!(item_id = %record.item_id, kind = %record.kind, "Outcome rejected");
                    }
                    Err(e) => tracing::warn!(error = %e, "Reject failed"),
                }
            }
            HostCommand::ApproveSkip { id } => self.approve_skip(id).await,
            HostCommand::RejectSkip { id } => {
                if self.skips.reject(id).is_none() {
                    tracing::warn!(id = %id, "Skip request not found");
                }
            }
            HostCommand::RestoreRemoved { item_id } => {
                match self.voting.restore_removed(&item_id, &mut self.queue) {
                    Ok(()) => self.broadcast_snapshots(),
                    Err(e) => tracing::warn!(error = %e, "Restore failed"),
                }
            }
            HostCommand::UpdateSettings { settings, reply } => {
                let result = settings.checked().map(|valid| {
                    self.settings = valid;
                });
                let ok = result.is_ok();
                let _ = reply.send(result);
                if ok {
                    self.broadcast_snapshots();
                }
            }
            HostCommand::Play => {
                if let Err(e) = self.playback.play().await {
                    tracing::warn!(error = %e, "Play failed");
                }
            }
            HostCommand::Pause => {
                if let Err(e) = self.playback.pause().await {
                    tracing::warn!(error = %e, "Pause failed");
                }
            }
            HostCommand::SkipCurrent => {
                if let Err(e) = self.playback.skip_to_next().await {
                    tracing::warn!(error = %e, "Skip failed");
                }
            }
            HostCommand::Query { reply } => {
                let _ = reply.send(self.host_view());
            }
            HostCommand::Shutdown => unreachable!("handled by the run loop"),
        }
    }

    // === Incoming guest messages ===

    async fn handle_incoming(&mut self, conn_id: String, message: PartyMessage) {
        match message {
            PartyMessage::JoinRequest {
                session_id,
                join_code,
                member_id,
                display_name,
                has_playback_account,
                location,
            } => {
                let request = JoinRequest {
                    session_id,
                    join_code,
                    member_id,
                    display_name,
                    has_playback_account,
                    location,
                };
                self.handle_join(conn_id, request).await;
            }
            PartyMessage::Vote {
                member_id,
                item_id,
                direction,
                ..
            } => self.handle_vote(&member_id, &item_id, direction),
            PartyMessage::SkipRequest {
                member_id, item_id, ..
            } => self.handle_skip_request(&member_id, item_id),
            PartyMessage::SearchRequest { member_id, query } => {
                self.handle_search(&conn_id, &member_id, &query).await;
            }
            PartyMessage::AddSongRequest { member_id, track } => {
                if self.is_admitted(&member_id) {
                    self.add_track(track, member_id).await;
                } else {
                    tracing::debug!(member_id = %member_id, "Add request from unadmitted member dropped");
                }
            }
            // Host-originated message types arriving from a peer
            other => {
                tracing::debug!(
                    conn_id = %conn_id,
                    kind = other.kind(),
                    "Unexpected message from peer dropped"
                );
            }
        }
    }

    async fn handle_join(&mut self, conn_id: String, request: JoinRequest) {
        let member_id = request.member_id.clone();

        let decision = match self.admission.admit(self.location.as_ref(), &request).await {
            Ok(distance_m) => {
                let kind = AdmissionController::register(&mut self.members, &request);
                tracing::info!(
                    member_id = %member_id,
                    distance_m = distance_m.round(),
                    reconnection = matches!(kind, AdmissionKind::Reconnection),
                    "Guest admitted"
                );
                PartyMessage::join_accepted(member_id.clone())
            }
            Err(rejection) => {
                tracing::info!(member_id = %member_id, reason = %rejection, "Guest rejected");
                PartyMessage::join_rejected(member_id.clone(), rejection.to_string())
            }
        };

        let accepted = matches!(decision, PartyMessage::JoinDecision { accepted: true, .. });

        // The membership snapshot fans out from PeerIdentified, after the
        // decision is on the wire: no peer observes a snapshot ahead of its
        // own still-pending join decision.
        self.deliver_decision(conn_id, member_id, decision, accepted);
    }

    /// Deliver a join decision once the transport reports the peer connected
    ///
    /// Accept-and-immediately-send races the transport's connection
    /// completion, so delivery retries with backoff for a bounded number of
    /// attempts, then gives up with a log.
    fn deliver_decision(
        &self,
        conn_id: String,
        member_id: MemberId,
        decision: PartyMessage,
        accepted: bool,
    ) {
        let connections = self.connections.clone();
        let cmd_tx = self.cmd_tx.clone();
        let attempts = self.config.decision_retry_attempts.max(1);
        let mut delay = self.config.decision_retry_base;

        tokio::spawn(async move {
            for attempt in 1..=attempts {
                if let Some(conn) = connections.connection(&conn_id) {
                    if conn.send(decision.clone()).await.is_ok() {
                        tracing::debug!(conn_id = %conn_id, attempt, "Join decision delivered");
                        if accepted {
                            let _ = cmd_tx
                                .send(HostCommand::PeerIdentified { conn_id, member_id })
                                .await;
                        }
                        return;
                    }
                }
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(DECISION_RETRY_MAX_DELAY);
                }
            }
            tracing::warn!(
                conn_id = %conn_id,
                member_id = %member_id,
                "Join decision could not be delivered"
            );
        });
    }

    fn handle_vote(&mut self, member_id: &MemberId, item_id: &ItemId, direction: VoteDirection) {
        if !self.is_admitted(member_id) {
            tracing::debug!(member_id = %member_id, "Vote from unadmitted member dropped");
            return;
        }

        let now = Utc::now();
        let result = self.voting.cast_vote(
            &mut self.queue,
            &mut self.limiter,
            &self.settings,
            member_id,
            item_id,
            direction,
            now,
        );

        match result {
            VoteResult::Accepted => {
                self.schedule_slot_restore(member_id.clone(), *item_id);

                let guest_count = self.guest_count();
                let resolution = self.voting.resolve(
                    &mut self.queue,
                    &mut self.limiter,
                    &self.settings,
                    guest_count,
                    item_id,
                );
                if resolution.is_some() {
                    // An applied removal invalidates skip requests too
                    if !self.queue.contains(item_id) {
                        self.skips.drop_for_item(item_id);
                    }
                }
                self.broadcast_snapshots();
            }
            VoteResult::Rejected(rejection) => {
                tracing::debug!(
                    member_id = %member_id,
                    item_id = %item_id,
                    ?rejection,
                    "Vote rejected"
                );
            }
        }
    }

    /// One independent restore timer per accepted vote
    fn schedule_slot_restore(&self, member_id: MemberId, item_id: ItemId) {
        let delay = self.settings.slot_restore_delay();
        let cmd_tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = cmd_tx
                .send(HostCommand::RestoreSlot { member_id, item_id })
                .await;
        });
    }

    fn handle_skip_request(&mut self, member_id: &MemberId, item_id: ItemId) {
        if !self.is_admitted(member_id) {
            tracing::debug!(member_id = %member_id, "Skip request from unadmitted member dropped");
            return;
        }
        if !self.queue.contains(&item_id) {
            tracing::debug!(item_id = %item_id, "Skip request for unknown item dropped");
            return;
        }
        if self.skips.request(item_id, member_id.clone()).is_some() {
            tracing::info!(member_id = %member_id, item_id = %item_id, "Skip requested");
        }
    }

    async fn handle_search(&mut self, conn_id: &str, member_id: &MemberId, query: &str) {
        if !self.is_admitted(member_id) {
            tracing::debug!(member_id = %member_id, "Search from unadmitted member dropped");
            return;
        }
        match self.playback.search(query, 25).await {
            Ok(results) => {
                if let Some(conn) = self.connections.connection(conn_id) {
                    let _ = conn.try_send(PartyMessage::SearchResults { results });
                }
            }
            Err(e) => tracing::warn!(error = %e, "Catalog search failed"),
        }
    }

    // === Host operations ===

    async fn load_demo_library(&mut self) {
        let host = host_member_id();
        for track in crate::collaborators::demo_library() {
            self.queue.append(QueueItem::new(track, host.clone()));
        }
        self.sync_playback_queue().await;
        tracing::info!(items = self.queue.len(), "Demo library loaded");
        self.broadcast_snapshots();
    }

    async fn add_track(&mut self, track: TrackSummary, added_by: MemberId) {
        tracing::info!(track_id = %track.track_id, added_by = %added_by, "Track added");
        self.queue.append(QueueItem::new(track, added_by));
        self.sync_playback_queue().await;
        self.broadcast_snapshots();
    }

    /// Hand the playback engine the queue's track ids
    async fn sync_playback_queue(&self) {
        if let Err(e) = self.playback.set_queue(&self.queue.track_ids()).await {
            tracing::warn!(error = %e, "Playback queue sync failed");
        }
    }

    fn approve_outcome(&mut self, id: Uuid) {
        match self
            .voting
            .approve_pending(id, &mut self.queue, &mut self.limiter)
        {
            Ok(record) => {
                tracing::info!(item_id = %record.item_id, kind = %record.kind, "Outcome approved");
                if !self.queue.contains(&record.item_id) {
                    self.skips.drop_for_item(&record.item_id);
                }
                self.broadcast_snapshots();
            }
            Err(e) => tracing::warn!(error = %e, "Approve failed"),
        }
    }

    async fn approve_skip(&mut self, id: Uuid) {
        let Some(request) = self.skips.approve(id) else {
            tracing::warn!(id = %id, "Skip request not found");
            return;
        };

        // Skipping the playing item needs the playback transport to move
        // off it before the structural removal
        if self.queue.is_current(&request.item_id) {
            if let Err(e) = self.playback.skip_to_next().await {
                tracing::warn!(error = %e, "Playback skip failed");
            }
        }

        if self.queue.remove(&request.item_id).is_some() {
            self.forget_item(&request.item_id);
            tracing::info!(item_id = %request.item_id, "Skip approved, item removed");
            self.broadcast_snapshots();
        }
    }

    /// Clean up every auxiliary record referencing a departed item
    fn forget_item(&mut self, item_id: &ItemId) {
        self.limiter.clear_item(item_id);
        self.voting.drop_pending_for_item(item_id);
        self.skips.drop_for_item(item_id);
    }

    // === Playback ticks ===

    async fn handle_tick(&mut self) {
        let tick = match self.playback.current_tick().await {
            Ok(tick) => tick,
            Err(e) => {
                tracing::warn!(error = %e, "Playback tick failed");
                return;
            }
        };

        // Follow the playback engine's track identity with the cursor
        if tick.track_id != self.last_track_id {
            if let Some(track_id) = &tick.track_id {
                let next_matches = self
                    .queue
                    .next_up()
                    .is_some_and(|item| &item.track.track_id == track_id);
                if next_matches {
                    self.queue.advance();
                } else if let Some(id) = self.queue.find_by_track(track_id).map(|i| i.id) {
                    self.queue.jump_to(&id);
                }
            }
            self.last_track_id = tick.track_id.clone();
            self.broadcast_snapshots();
        }

        let item_id = tick
            .track_id
            .as_deref()
            .and_then(|tid| self.queue.find_by_track(tid))
            .map(|item| item.id);
        self.connections
            .broadcast(PartyMessage::now_playing(item_id, &tick));
    }

    // === Projections & broadcast ===

    fn is_admitted(&self, member_id: &MemberId) -> bool {
        self.members
            .iter()
            .any(|m| &m.id == member_id && m.is_admitted)
    }

    fn guest_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_admitted).count()
    }

    fn party_state(&self) -> PartyState {
        PartyState {
            session_id: self.session_id.clone(),
            host_name: self.host_name.clone(),
            created_at: self.created_at,
            queue: self.queue.items_snapshot(),
            now_playing_item_id: self.queue.current_id(),
            members: self.members.clone(),
        }
    }

    fn host_view(&self) -> HostView {
        HostView {
            state: self.party_state(),
            settings: self.settings.clone(),
            pending_outcomes: self.voting.pending().to_vec(),
            pending_skips: self.skips.pending().to_vec(),
            recently_removed: self.voting.recently_removed().cloned().collect(),
        }
    }

    /// Fan out personalized snapshots to every identified peer
    ///
    /// Fire-and-forget: a slow consumer drops frames rather than blocking
    /// the mutation that triggered the broadcast. With nobody identified a
    /// single non-personalized snapshot goes to whoever is listening
    /// (solo/local testing).
    fn broadcast_snapshots(&self) {
        let state = self.party_state();
        let identified = self.connections.identified();

        if identified.is_empty() {
            self.connections
                .broadcast(PartyMessage::snapshot_plain(state));
            return;
        }

        let now = Utc::now();
        for (member_id, conn) in identified {
            let view = personal_view(&self.limiter, &self.settings, &member_id, now);
            let message =
                PartyMessage::snapshot(state.clone(), view.cooldowns, view.remaining_action_slots);
            if conn.try_send(message).is_err() {
                tracing::debug!(member_id = %member_id, "Snapshot dropped (slow consumer)");
            }
        }
    }
}
