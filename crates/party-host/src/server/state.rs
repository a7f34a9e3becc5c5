//! Host state
//!
//! Shared dependencies for the peer endpoint handlers.

use crate::connection::ConnectionManager;
use crate::session::SessionHandle;
use std::sync::Arc;

/// Application state for the host server
#[derive(Clone)]
pub struct HostState {
    /// Handle to the session controller task
    handle: SessionHandle,
    /// Live peer connections
    connections: Arc<ConnectionManager>,
}

impl HostState {
    pub fn new(handle: SessionHandle, connections: Arc<ConnectionManager>) -> Self {
        Self {
            handle,
            connections,
        }
    }

    /// Get the session controller handle
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Get the connection manager
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }
}

impl std::fmt::Debug for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostState")
            .field("session_id", &self.handle.session_id())
            .field("connections", &self.connections)
            .finish()
    }
}
