//! Socket-level smoke test
//!
//! Runs the real axum server and talks to it exactly as a guest device
//! would: HTTP health probe, WebSocket join, snapshot receipt.
//!
//! Run with: cargo test -p integration-tests --test ws_smoke

use futures_util::{SinkExt, StreamExt};
use integration_tests::{host_fix, TestServer};
use party_core::MemberId;
use party_host::protocol::PartyMessage;
use party_host::session::{GuestPhase, GuestSessionController};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start().await.expect("Failed to start server");

    let body = reqwest::get(server.http_url("/health"))
        .await
        .expect("Request failed")
        .text()
        .await
        .expect("Body read failed");
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_join_over_websocket() {
    let server = TestServer::start().await.expect("Failed to start server");
    let handle = server.state.handle().clone();

    let (mut socket, _) = connect_async(server.ws_url())
        .await
        .expect("WebSocket connect failed");

    // Drive the real client state machine over the socket
    let mut guest =
        GuestSessionController::new(MemberId::new("ws-device-1"), "Socket Guest", false);
    let (_attempt, request) = guest.begin_join(
        &handle.join_payload(),
        Some(host_fix().offset_north_m(12.0)),
    );
    socket
        .send(Message::Text(request.to_json().unwrap()))
        .await
        .expect("Send failed");

    // The decision must come first, then the snapshot
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");

        let Message::Text(text) = frame else { continue };
        let message = PartyMessage::from_json(&text).expect("undecodable frame");

        let is_snapshot = matches!(message, PartyMessage::StateSnapshot { .. });
        if is_snapshot {
            assert!(
                guest.is_admitted(),
                "snapshot observed before the join decision"
            );
        }
        guest.handle_message(message);
        if is_snapshot {
            break;
        }
    }

    assert_eq!(guest.phase(), &GuestPhase::Admitted);
    let party = guest.party().expect("snapshot mirrored");
    assert_eq!(party.members.len(), 1);
    assert_eq!(party.members[0].id, MemberId::new("ws-device-1"));

    socket.close(None).await.ok();
}

#[tokio::test]
async fn test_malformed_frame_is_survivable() {
    let server = TestServer::start().await.expect("Failed to start server");
    let handle = server.state.handle().clone();

    let (mut socket, _) = connect_async(server.ws_url())
        .await
        .expect("WebSocket connect failed");

    // Garbage must be dropped without killing the dispatch loop
    socket
        .send(Message::Text("{not json".to_string()))
        .await
        .expect("Send failed");

    let request = PartyMessage::JoinRequest {
        session_id: handle.session_id().clone(),
        join_code: handle.join_code().clone(),
        member_id: MemberId::new("ws-device-2"),
        display_name: "Second Guest".to_string(),
        has_playback_account: true,
        location: Some(host_fix()),
    };
    socket
        .send(Message::Text(request.to_json().unwrap()))
        .await
        .expect("Send failed");

    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");

        if let Message::Text(text) = frame {
            if let Ok(PartyMessage::JoinDecision { accepted, .. }) =
                PartyMessage::from_json(&text)
            {
                assert!(accepted);
                break;
            }
        }
    }
}
