//! Test fixtures
//!
//! A `TestParty` runs a real session controller; `PeerLink`s stand in for
//! guest sockets using the same mpsc channels the WebSocket write task
//! would own, so message ordering is exactly what a guest observes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use party_common::PartyConfig;
use party_core::{GeoPoint, LocationProvider, MemberId, TrackSummary};
use party_engine::{PartySettings, VotingMode};
use party_host::collaborators::{DemoPlayback, FixedLocation};
use party_host::connection::ConnectionManager;
use party_host::protocol::PartyMessage;
use party_host::session::{HostCommand, HostView, SessionController, SessionHandle};
use tokio::sync::mpsc;

use crate::helpers::recv_message;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Fixed host coordinate used by every test party
#[must_use]
pub fn host_fix() -> GeoPoint {
    GeoPoint::new(48.2082, 16.3738)
}

/// Party config tuned for fast tests
#[must_use]
pub fn test_party_config() -> PartyConfig {
    PartyConfig {
        host_name: "Test Host".to_string(),
        proximity_radius_m: 65.0,
        location_wait: Duration::from_millis(500),
        decision_retry_attempts: 5,
        decision_retry_base: Duration::from_millis(20),
    }
}

/// Settings with host approval switched on
#[must_use]
pub fn approval_settings() -> PartySettings {
    PartySettings {
        voting_mode: VotingMode::HostApproval,
        ..PartySettings::default()
    }
}

/// A running session controller plus its connection manager
pub struct TestParty {
    pub handle: SessionHandle,
    pub connections: Arc<ConnectionManager>,
}

impl TestParty {
    /// Start a party with an authorized host location fix
    #[must_use]
    pub fn start() -> Self {
        Self::start_with_location(Arc::new(FixedLocation::new(host_fix())))
    }

    /// Start a party with a custom positioning provider
    #[must_use]
    pub fn start_with_location(location: Arc<dyn LocationProvider>) -> Self {
        let connections = ConnectionManager::new_shared();
        let handle = SessionController::spawn(
            test_party_config(),
            connections.clone(),
            Arc::new(DemoPlayback::new()),
            location,
        );
        Self {
            handle,
            connections,
        }
    }

    /// Attach a channel-backed peer, as the socket layer would
    #[must_use]
    pub fn connect_peer(&self) -> PeerLink {
        let conn_id = format!("conn-{}", unique_suffix());
        let (tx, rx) = mpsc::channel(64);
        self.connections.add_connection(conn_id.clone(), tx);
        PeerLink {
            conn_id,
            rx,
            handle: self.handle.clone(),
        }
    }

    /// Build a join request for this party
    #[must_use]
    pub fn join_request(&self, device: &str, location: Option<GeoPoint>) -> PartyMessage {
        PartyMessage::JoinRequest {
            session_id: self.handle.session_id().clone(),
            join_code: self.handle.join_code().clone(),
            member_id: MemberId::new(device),
            display_name: format!("Guest {device}"),
            has_playback_account: false,
            location,
        }
    }

    /// Connect a peer and take it through a successful join
    ///
    /// Waits for the accepted decision and the snapshot that follows it, so
    /// the peer is fully identified when this returns.
    pub async fn join_guest(&self, device: &str, offset_m: f64) -> PeerLink {
        let mut peer = self.connect_peer();
        let request = self.join_request(device, Some(host_fix().offset_north_m(offset_m)));
        peer.send(request).await;

        let (accepted, reason) = peer.expect_decision().await;
        assert!(accepted, "join rejected: {reason:?}");
        peer.expect_snapshot().await;
        peer
    }

    /// Read the current host view
    pub async fn view(&self) -> HostView {
        self.handle.query().await.expect("controller stopped")
    }

    /// Append `count` tracks and return the queue item ids in order
    pub async fn seed_queue(&self, count: usize) -> Vec<party_core::ItemId> {
        for n in 0..count {
            let suffix = unique_suffix();
            self.handle
                .send(HostCommand::AddTrack {
                    track: TrackSummary::new(
                        format!("test-{suffix}"),
                        format!("Test Song {n}"),
                        "Test Artist",
                        180,
                    ),
                    added_by: None,
                })
                .await;
        }
        self.view().await.state.queue.iter().map(|i| i.id).collect()
    }
}

/// One simulated guest link
pub struct PeerLink {
    pub conn_id: String,
    rx: mpsc::Receiver<PartyMessage>,
    handle: SessionHandle,
}

impl PeerLink {
    /// Deliver a frame to the controller as this peer
    pub async fn send(&self, message: PartyMessage) {
        assert!(
            self.handle
                .send(HostCommand::Incoming {
                    conn_id: self.conn_id.clone(),
                    message,
                })
                .await,
            "controller stopped"
        );
    }

    /// Next message on this link, within the test timeout
    pub async fn recv(&mut self) -> PartyMessage {
        recv_message(&mut self.rx).await
    }

    /// Skip frames until a join decision arrives
    pub async fn expect_decision(&mut self) -> (bool, Option<String>) {
        loop {
            if let PartyMessage::JoinDecision {
                accepted, reason, ..
            } = self.recv().await
            {
                return (accepted, reason);
            }
        }
    }

    /// Skip frames until a state snapshot arrives
    pub async fn expect_snapshot(
        &mut self,
    ) -> (
        party_core::PartyState,
        std::collections::HashMap<party_core::ItemId, u64>,
        Option<u32>,
    ) {
        loop {
            if let PartyMessage::StateSnapshot {
                state,
                cooldowns,
                remaining_action_slots,
            } = self.recv().await
            {
                return (state, cooldowns.unwrap_or_default(), remaining_action_slots);
            }
        }
    }

    /// Drain whatever is queued right now
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}
