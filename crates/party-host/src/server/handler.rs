//! WebSocket handler
//!
//! Bridges one peer socket to the session controller: inbound frames are
//! decoded and forwarded as commands, outbound messages drain from the
//! connection's channel. Malformed frames are dropped with a log; they
//! never take down the dispatch loop.

use crate::protocol::PartyMessage;
use crate::server::HostState;
use crate::session::HostCommand;
use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 64;

/// Peer endpoint handler
pub async fn party_handler(
    State(state): State<HostState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded peer socket
async fn handle_socket(state: HostState, socket: axum::extract::ws::WebSocket) {
    let conn_id = Uuid::new_v4().to_string();

    let (tx, mut rx) = mpsc::channel::<PartyMessage>(MESSAGE_BUFFER_SIZE);
    state.connections().add_connection(conn_id.clone(), tx);

    tracing::info!(conn_id = %conn_id, "Peer connected");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Outbound pump: connection channel -> socket
    let conn_id_send = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message.to_json() {
                Ok(json) => {
                    if ws_sink.send(Message::Text(json.into())).await.is_err() {
                        tracing::debug!(conn_id = %conn_id_send, "Peer send failed");
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(conn_id = %conn_id_send, error = %e, "Message encode failed");
                }
            }
        }
        let _ = ws_sink.close().await;
    });

    // Inbound pump: socket -> controller commands
    let handle = state.handle().clone();
    let conn_id_recv = conn_id.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(frame) = ws_stream.next().await {
            match frame {
                Ok(Message::Text(text)) => match PartyMessage::from_json(&text) {
                    Ok(message) => {
                        handle
                            .send(HostCommand::Incoming {
                                conn_id: conn_id_recv.clone(),
                                message,
                            })
                            .await;
                    }
                    Err(e) => {
                        // Malformed frames are dropped, never fatal
                        tracing::debug!(
                            conn_id = %conn_id_recv,
                            error = %e,
                            "Undecodable frame dropped"
                        );
                    }
                },
                Ok(Message::Binary(_)) => {
                    tracing::debug!(conn_id = %conn_id_recv, "Binary frame dropped");
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(conn_id = %conn_id_recv, "Peer closed connection");
                    break;
                }
                Ok(_) => {
                    // Ping/pong handled by axum
                }
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id_recv, error = %e, "Socket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = recv_task => {}
        _ = send_task => {}
    }

    cleanup_connection(&state, &conn_id).await;
}

/// Tear down a departed peer
async fn cleanup_connection(state: &HostState, conn_id: &str) {
    tracing::info!(conn_id = %conn_id, "Peer disconnected");
    state.connections().remove_connection(conn_id);
    state
        .handle()
        .send(HostCommand::PeerDisconnected {
            conn_id: conn_id.to_string(),
        })
        .await;
}
