//! Host server setup
//!
//! Exposes the peer endpoint (`/party`, WebSocket upgrade) and a health
//! check, and wires configuration, collaborators, and the session
//! controller together.

mod handler;
mod state;

pub use handler::party_handler;
pub use state::HostState;

use crate::collaborators::{DemoPlayback, FixedLocation};
use crate::connection::ConnectionManager;
use crate::session::SessionController;
use axum::{routing::get, Router};
use party_common::{AppError, HostConfig};
use party_core::{GeoPoint, LocationProvider, PlaybackControl};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the host router
pub fn create_router() -> Router<HostState> {
    Router::new()
        .route("/party", get(party_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: HostState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Assemble connection manager, collaborators, and session controller
pub fn create_host_state(
    config: &HostConfig,
    playback: Arc<dyn PlaybackControl>,
    location: Arc<dyn LocationProvider>,
) -> HostState {
    let connections = ConnectionManager::new_shared();
    let handle = SessionController::spawn(
        config.party.clone(),
        connections.clone(),
        playback,
        location,
    );

    tracing::info!(
        session_id = %handle.session_id(),
        join_payload = %handle.join_payload().encode(),
        "Session ready"
    );

    HostState::new(handle, connections)
}

/// Run the host server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting host server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Peer endpoint listening on ws://{}/party", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete host with configuration
///
/// Uses the demo playback engine; the host location comes from
/// `PARTY_HOST_LAT`/`PARTY_HOST_LON` when set, otherwise positioning is
/// reported unavailable and remote joins fail the location check.
pub async fn run(config: HostConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid bind address: {e}")))?;

    let location: Arc<dyn LocationProvider> = match host_fix_from_env() {
        Some(fix) => Arc::new(FixedLocation::new(fix)),
        None => {
            tracing::warn!("PARTY_HOST_LAT/LON not set; admission will reject remote guests");
            Arc::new(FixedLocation::unavailable())
        }
    };

    let state = create_host_state(&config, Arc::new(DemoPlayback::new()), location);
    let app = create_app(state);

    run_server(app, addr).await
}

fn host_fix_from_env() -> Option<GeoPoint> {
    let lat: f64 = std::env::var("PARTY_HOST_LAT").ok()?.parse().ok()?;
    let lon: f64 = std::env::var("PARTY_HOST_LON").ok()?.parse().ok()?;
    Some(GeoPoint::new(lat, lon))
}
