//! Individual peer connection
//!
//! Represents a single connected peer and its outbound message channel.
//! The channel preserves per-peer delivery order: a join decision queued
//! before a snapshot is observed before it.

use crate::protocol::PartyMessage;
use parking_lot::RwLock;
use party_core::MemberId;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Link established, no member bound yet
    Connecting,
    /// A join decision was delivered and the member is bound
    Identified,
    /// Link is gone
    Disconnected,
}

/// A single connected peer
pub struct Connection {
    /// Transport-level connection id (fresh per socket)
    conn_id: String,

    /// Member bound to this connection after admission
    member_id: RwLock<Option<MemberId>>,

    state: RwLock<ConnectionState>,

    /// Outbound channel to the socket write task
    sender: mpsc::Sender<PartyMessage>,

    created_at: Instant,
}

impl Connection {
    pub fn new(conn_id: String, sender: mpsc::Sender<PartyMessage>) -> Arc<Self> {
        Arc::new(Self {
            conn_id,
            member_id: RwLock::new(None),
            state: RwLock::new(ConnectionState::Connecting),
            sender,
            created_at: Instant::now(),
        })
    }

    #[must_use]
    pub fn conn_id(&self) -> &str {
        &self.conn_id
    }

    #[must_use]
    pub fn member_id(&self) -> Option<MemberId> {
        self.member_id.read().clone()
    }

    pub fn set_member_id(&self, member_id: MemberId) {
        *self.member_id.write() = Some(member_id);
        *self.state.write() = ConnectionState::Identified;
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    #[must_use]
    pub fn is_identified(&self) -> bool {
        self.state() == ConnectionState::Identified
    }

    /// Connection age (diagnostics)
    #[must_use]
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    /// Send a message, waiting for channel capacity
    pub async fn send(
        &self,
        message: PartyMessage,
    ) -> Result<(), mpsc::error::SendError<PartyMessage>> {
        self.sender.send(message).await
    }

    /// Fire-and-forget send; a full channel drops the message
    pub fn try_send(
        &self,
        message: PartyMessage,
    ) -> Result<(), mpsc::error::TrySendError<PartyMessage>> {
        self.sender.try_send(message)
    }

    /// Whether the socket write task is gone
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("conn_id", &self.conn_id)
            .field("state", &self.state())
            .finish()
    }
}
