//! Connection manager
//!
//! Tracks all live peer connections using `DashMap` for thread-safe access.
//! The session controller resolves members to connections through this map
//! when fanning out snapshots; socket tasks add and remove entries.

use super::{Connection, ConnectionState};
use crate::protocol::PartyMessage;
use dashmap::DashMap;
use party_core::MemberId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// All live peer connections
pub struct ConnectionManager {
    /// Connections by transport connection id
    connections: DashMap<String, Arc<Connection>>,

    /// Member to connection id; one live connection per member, the newest
    /// wins on reconnection
    member_connections: DashMap<MemberId, String>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            member_connections: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(
        &self,
        conn_id: String,
        sender: mpsc::Sender<PartyMessage>,
    ) -> Arc<Connection> {
        let connection = Connection::new(conn_id.clone(), sender);
        self.connections.insert(conn_id.clone(), connection.clone());

        tracing::debug!(conn_id = %conn_id, "Connection added");

        connection
    }

    /// Remove a connection, cleaning the member mapping if it points here
    pub fn remove_connection(&self, conn_id: &str) {
        if let Some((_, connection)) = self.connections.remove(conn_id) {
            connection.set_state(ConnectionState::Disconnected);

            if let Some(member_id) = connection.member_id() {
                // Only drop the mapping if it still targets this connection;
                // a reconnection may already have claimed the member
                self.member_connections
                    .remove_if(&member_id, |_, mapped| mapped == conn_id);
            }

            tracing::debug!(conn_id = %conn_id, "Connection removed");
        }
    }

    /// Bind a member to a connection (after its join decision was delivered)
    pub fn identify(&self, conn_id: &str, member_id: MemberId) -> bool {
        let Some(connection) = self.connection(conn_id) else {
            return false;
        };
        connection.set_member_id(member_id.clone());
        self.member_connections
            .insert(member_id.clone(), conn_id.to_string());

        tracing::debug!(conn_id = %conn_id, member_id = %member_id, "Connection identified");
        true
    }

    #[must_use]
    pub fn connection(&self, conn_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(conn_id).map(|r| r.clone())
    }

    #[must_use]
    pub fn connection_for_member(&self, member_id: &MemberId) -> Option<Arc<Connection>> {
        let conn_id = self.member_connections.get(member_id)?.clone();
        self.connection(&conn_id)
    }

    #[must_use]
    pub fn has_connection(&self, conn_id: &str) -> bool {
        self.connections.contains_key(conn_id)
    }

    /// All identified (member, connection) pairs
    #[must_use]
    pub fn identified(&self) -> Vec<(MemberId, Arc<Connection>)> {
        self.member_connections
            .iter()
            .filter_map(|entry| {
                self.connection(entry.value())
                    .map(|conn| (entry.key().clone(), conn))
            })
            .collect()
    }

    /// Fire-and-forget a message to every identified connection
    ///
    /// Peers still waiting on a join decision are skipped; nothing may be
    /// observed ahead of a pending decision on that link.
    pub fn broadcast(&self, message: PartyMessage) -> usize {
        let mut sent = 0;
        for entry in self.connections.iter() {
            if entry.is_identified() && entry.try_send(message.clone()).is_ok() {
                sent += 1;
            }
        }
        sent
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn identified_count(&self) -> usize {
        self.member_connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("identified", &self.member_connections.len())
            .finish()
    }
}
