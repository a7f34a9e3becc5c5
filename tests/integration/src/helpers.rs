//! Test helpers
//!
//! Channel receive with timeout, and a socket-level test server for the
//! end-to-end WebSocket tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use party_common::{HostConfig, ServerConfig};
use party_host::collaborators::{DemoPlayback, FixedLocation};
use party_host::protocol::PartyMessage;
use party_host::server::{create_app, create_host_state, HostState};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::fixtures::{host_fix, test_party_config};

/// Per-message receive timeout
pub const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Receive one message or fail the test
pub async fn recv_message(rx: &mut mpsc::Receiver<PartyMessage>) -> PartyMessage {
    tokio::time::timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("peer channel closed")
}

/// A host server bound to an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: HostState,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a full host server for socket-level tests
    pub async fn start() -> Result<Self> {
        let config = HostConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            party: test_party_config(),
        };

        let state = create_host_state(
            &config,
            Arc::new(DemoPlayback::new()),
            Arc::new(FixedLocation::new(host_fix())),
        );
        let app = create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// WebSocket URL of the peer endpoint
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}/party", self.addr)
    }

    /// HTTP URL of a path on the server
    #[must_use]
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}
