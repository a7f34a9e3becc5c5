//! Session controller end-to-end tests
//!
//! Drive a real session controller through its command channel with
//! channel-backed peers: admission, reconnection, voting outcomes in both
//! modes, rate limiting, skip requests, and queue administration.
//!
//! Run with: cargo test -p integration-tests --test session_tests

use integration_tests::{approval_settings, host_fix, TestParty};
use party_core::{MemberId, OutcomeKind, VoteDirection};
use party_engine::{EngineError, PartySettings};
use party_host::protocol::PartyMessage;
use party_host::session::HostCommand;

// ============================================================================
// Admission
// ============================================================================

#[tokio::test]
async fn test_join_and_reconnect_keep_headcount() {
    let party = TestParty::start();

    // First join admits a new member
    let mut guest = party.join_guest("device-A", 10.0).await;
    let view = party.view().await;
    assert_eq!(view.state.members.len(), 1);
    assert!(view.state.members[0].is_admitted);

    // Re-sending the same join request simulates a reconnect
    guest
        .send(party.join_request("device-A", Some(host_fix().offset_north_m(10.0))))
        .await;
    let (accepted, _) = guest.expect_decision().await;
    assert!(accepted);

    let view = party.view().await;
    assert_eq!(view.state.members.len(), 1, "reconnection must not re-count");
}

#[tokio::test]
async fn test_reconnect_from_new_connection() {
    let party = TestParty::start();
    let _first = party.join_guest("device-A", 5.0).await;

    // Same device on a fresh link (app restart)
    let second = party.join_guest("device-A", 5.0).await;
    drop(second);

    let view = party.view().await;
    assert_eq!(view.state.members.len(), 1);
}

#[tokio::test]
async fn test_join_rejected_when_too_far() {
    let party = TestParty::start();
    let mut peer = party.connect_peer();

    peer.send(party.join_request("device-B", Some(host_fix().offset_north_m(200.0))))
        .await;

    let (accepted, reason) = peer.expect_decision().await;
    assert!(!accepted);
    assert!(reason.unwrap().contains("200"));

    let view = party.view().await;
    assert!(view.state.members.is_empty());
}

#[tokio::test]
async fn test_join_rejected_on_wrong_code() {
    let party = TestParty::start();
    let mut peer = party.connect_peer();

    let request = match party.join_request("device-C", Some(host_fix())) {
        PartyMessage::JoinRequest {
            session_id,
            member_id,
            display_name,
            has_playback_account,
            location,
            ..
        } => PartyMessage::JoinRequest {
            session_id,
            join_code: "WRONG0".into(),
            member_id,
            display_name,
            has_playback_account,
            location,
        },
        other => panic!("unexpected fixture message {}", other.kind()),
    };
    peer.send(request).await;

    let (accepted, reason) = peer.expect_decision().await;
    assert!(!accepted);
    assert!(reason.unwrap().contains("join code"));
}

#[tokio::test]
async fn test_join_rejected_without_host_location() {
    let party = TestParty::start_with_location(std::sync::Arc::new(
        party_host::collaborators::FixedLocation::denied(),
    ));
    let mut peer = party.connect_peer();

    peer.send(party.join_request("device-D", Some(host_fix()))).await;

    let (accepted, reason) = peer.expect_decision().await;
    assert!(!accepted);
    assert!(reason.unwrap().contains("location"));
}

// ============================================================================
// Voting - automatic mode
// ============================================================================

#[tokio::test]
async fn test_down_threshold_removes_item() {
    let party = TestParty::start();
    let ids = party.seed_queue(3).await;
    let target = ids[2];

    let g1 = party.join_guest("voter-1", 5.0).await;
    let g2 = party.join_guest("voter-2", 5.0).await;
    let _g3 = party.join_guest("voter-3", 5.0).await;
    let _g4 = party.join_guest("voter-4", 5.0).await;

    // 4 guests at 50% -> threshold 2
    g1.send(PartyMessage::vote(
        MemberId::new("voter-1"),
        target,
        VoteDirection::Down,
    ))
    .await;
    g2.send(PartyMessage::vote(
        MemberId::new("voter-2"),
        target,
        VoteDirection::Down,
    ))
    .await;

    let view = party.view().await;
    assert!(view.state.queue.iter().all(|i| i.id != target));
    assert!(view.recently_removed.iter().any(|i| i.id == target));
}

#[tokio::test]
async fn test_vote_on_now_playing_is_noop() {
    let party = TestParty::start();
    let ids = party.seed_queue(3).await;

    let guest = party.join_guest("voter-1", 5.0).await;
    guest
        .send(PartyMessage::vote(
            MemberId::new("voter-1"),
            ids[0],
            VoteDirection::Down,
        ))
        .await;

    let view = party.view().await;
    let current = view.state.item(&ids[0]).unwrap();
    assert_eq!(current.down_votes.len(), 0);
    assert_eq!(view.state.queue.len(), 3);
}

#[tokio::test]
async fn test_next_up_vote_rules() {
    let party = TestParty::start();
    // Threshold 100% so single votes stay inert
    party
        .handle
        .update_settings(PartySettings {
            threshold_percent: 100,
            ..PartySettings::default()
        })
        .await
        .unwrap();

    let ids = party.seed_queue(3).await;
    let guest = party.join_guest("voter-1", 5.0).await;
    let _other = party.join_guest("voter-2", 5.0).await;

    // Up-vote on next-up is rejected outright
    guest
        .send(PartyMessage::vote(
            MemberId::new("voter-1"),
            ids[1],
            VoteDirection::Up,
        ))
        .await;
    let view = party.view().await;
    assert_eq!(view.state.item(&ids[1]).unwrap().up_votes.len(), 0);

    // Down-vote on next-up counts
    guest
        .send(PartyMessage::vote(
            MemberId::new("voter-1"),
            ids[1],
            VoteDirection::Down,
        ))
        .await;
    let view = party.view().await;
    assert_eq!(view.state.item(&ids[1]).unwrap().down_votes.len(), 1);
}

#[tokio::test]
async fn test_unadmitted_vote_is_dropped() {
    let party = TestParty::start();
    let ids = party.seed_queue(3).await;

    let peer = party.connect_peer();
    peer.send(PartyMessage::vote(
        MemberId::new("stranger"),
        ids[2],
        VoteDirection::Down,
    ))
    .await;

    let view = party.view().await;
    assert_eq!(view.state.item(&ids[2]).unwrap().down_votes.len(), 0);
}

// ============================================================================
// Voting - host approval mode
// ============================================================================

#[tokio::test]
async fn test_approval_mode_reject_then_approve() {
    let party = TestParty::start();
    party
        .handle
        .update_settings(approval_settings())
        .await
        .unwrap();

    let ids = party.seed_queue(3).await;
    let target = ids[2];

    let g1 = party.join_guest("voter-1", 5.0).await;
    let g2 = party.join_guest("voter-2", 5.0).await;
    let _g3 = party.join_guest("voter-3", 5.0).await;
    let _g4 = party.join_guest("voter-4", 5.0).await;

    g1.send(PartyMessage::vote(
        MemberId::new("voter-1"),
        target,
        VoteDirection::Down,
    ))
    .await;
    g2.send(PartyMessage::vote(
        MemberId::new("voter-2"),
        target,
        VoteDirection::Down,
    ))
    .await;

    // The crossing parked a pending outcome instead of mutating the queue
    let view = party.view().await;
    assert_eq!(view.pending_outcomes.len(), 1);
    assert_eq!(view.pending_outcomes[0].kind, OutcomeKind::Remove);
    assert!(view.state.item(&target).is_some());

    // Reject: queue unchanged, votes intact
    let pending_id = view.pending_outcomes[0].id;
    party
        .handle
        .send(HostCommand::RejectOutcome { id: pending_id })
        .await;
    let view = party.view().await;
    assert!(view.pending_outcomes.is_empty());
    assert_eq!(view.state.item(&target).unwrap().down_votes.len(), 2);

    // A third vote re-crosses the threshold; approve applies the removal
    let g3 = party.join_guest("voter-3", 5.0).await;
    g3.send(PartyMessage::vote(
        MemberId::new("voter-3"),
        target,
        VoteDirection::Down,
    ))
    .await;
    let view = party.view().await;
    assert_eq!(view.pending_outcomes.len(), 1);

    let pending_id = view.pending_outcomes[0].id;
    party
        .handle
        .send(HostCommand::ApproveOutcome { id: pending_id })
        .await;
    let view = party.view().await;
    assert!(view.state.item(&target).is_none());
    let removed = view
        .recently_removed
        .iter()
        .find(|i| i.id == target)
        .expect("removed item retained");
    assert!(removed.down_votes.is_empty());
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_cooldown_blocks_second_vote() {
    let party = TestParty::start();
    party
        .handle
        .update_settings(PartySettings {
            threshold_percent: 100,
            cooldown_minutes: 20,
            ..PartySettings::default()
        })
        .await
        .unwrap();

    let ids = party.seed_queue(3).await;
    let target = ids[2];

    let mut guest = party.join_guest("voter-1", 5.0).await;
    let _other = party.join_guest("voter-2", 5.0).await;
    guest.drain();

    guest
        .send(PartyMessage::vote(
            MemberId::new("voter-1"),
            target,
            VoteDirection::Down,
        ))
        .await;

    // The snapshot after the accepted vote reports the personal cooldown
    let remaining = loop {
        let (_, cooldowns, slots) = guest.expect_snapshot().await;
        if let Some(remaining) = cooldowns.get(&target) {
            assert_eq!(slots, Some(2));
            break *remaining;
        }
    };
    assert!(remaining > 0);
    assert!(remaining <= 20 * 60);

    // Second vote inside the window is rejected: the footprint cannot flip
    guest
        .send(PartyMessage::vote(
            MemberId::new("voter-1"),
            target,
            VoteDirection::Up,
        ))
        .await;
    let view = party.view().await;
    let item = view.state.item(&target).unwrap();
    assert_eq!(item.down_votes.len(), 1);
    assert_eq!(item.up_votes.len(), 0);
}

#[tokio::test]
async fn test_action_slots_cap_concurrent_votes() {
    let party = TestParty::start();
    party
        .handle
        .update_settings(PartySettings {
            threshold_percent: 100,
            cooldown_minutes: 20,
            max_concurrent_actions: 2,
            ..PartySettings::default()
        })
        .await
        .unwrap();

    let ids = party.seed_queue(5).await;
    let guest = party.join_guest("voter-1", 5.0).await;
    let _other = party.join_guest("voter-2", 5.0).await;

    for item in [ids[2], ids[3], ids[4]] {
        guest
            .send(PartyMessage::vote(
                MemberId::new("voter-1"),
                item,
                VoteDirection::Down,
            ))
            .await;
    }

    // Two slots, three attempts: the third vote found no slot
    let view = party.view().await;
    let counted: usize = view
        .state
        .queue
        .iter()
        .map(|i| i.down_votes.len())
        .sum();
    assert_eq!(counted, 2);
}

// ============================================================================
// Skip requests
// ============================================================================

#[tokio::test]
async fn test_skip_request_lifecycle() {
    let party = TestParty::start();
    let ids = party.seed_queue(3).await;

    let guest = party.join_guest("voter-1", 5.0).await;
    guest
        .send(PartyMessage::skip_request(MemberId::new("voter-1"), ids[2]))
        .await;
    // Duplicate while pending is ignored
    guest
        .send(PartyMessage::skip_request(MemberId::new("voter-1"), ids[2]))
        .await;

    let view = party.view().await;
    assert_eq!(view.pending_skips.len(), 1);

    let skip_id = view.pending_skips[0].id;
    party.handle.send(HostCommand::ApproveSkip { id: skip_id }).await;

    let view = party.view().await;
    assert!(view.pending_skips.is_empty());
    assert!(view.state.item(&ids[2]).is_none());
}

#[tokio::test]
async fn test_skip_of_current_item_advances() {
    let party = TestParty::start();
    let ids = party.seed_queue(3).await;

    let guest = party.join_guest("voter-1", 5.0).await;
    guest
        .send(PartyMessage::skip_request(MemberId::new("voter-1"), ids[0]))
        .await;

    let view = party.view().await;
    let skip_id = view.pending_skips[0].id;
    party.handle.send(HostCommand::ApproveSkip { id: skip_id }).await;

    let view = party.view().await;
    assert!(view.state.item(&ids[0]).is_none());
    // The old next-up item is now current
    assert_eq!(view.state.now_playing_item_id, Some(ids[1]));
}

#[tokio::test]
async fn test_skip_reject_discards_record() {
    let party = TestParty::start();
    let ids = party.seed_queue(2).await;

    let guest = party.join_guest("voter-1", 5.0).await;
    guest
        .send(PartyMessage::skip_request(MemberId::new("voter-1"), ids[1]))
        .await;

    let view = party.view().await;
    let skip_id = view.pending_skips[0].id;
    party.handle.send(HostCommand::RejectSkip { id: skip_id }).await;

    let view = party.view().await;
    assert!(view.pending_skips.is_empty());
    assert!(view.state.item(&ids[1]).is_some());
}

// ============================================================================
// Queue administration
// ============================================================================

#[tokio::test]
async fn test_reorder_upcoming_from_host() {
    let party = TestParty::start();
    let ids = party.seed_queue(4).await;

    party
        .handle
        .send(HostCommand::ReorderUpcoming {
            source_offsets: vec![1],
            destination_offset: 0,
        })
        .await;

    let view = party.view().await;
    let order: Vec<_> = view.state.queue.iter().map(|i| i.id).collect();
    assert_eq!(order, vec![ids[0], ids[2], ids[1], ids[3]]);
    assert_eq!(view.state.now_playing_item_id, Some(ids[0]));
}

#[tokio::test]
async fn test_restore_removed_item() {
    let party = TestParty::start();
    let ids = party.seed_queue(3).await;
    let target = ids[2];

    let guest = party.join_guest("voter-1", 5.0).await;
    // Single guest: threshold 1, the vote removes immediately
    guest
        .send(PartyMessage::vote(
            MemberId::new("voter-1"),
            target,
            VoteDirection::Down,
        ))
        .await;

    let view = party.view().await;
    assert!(view.state.item(&target).is_none());

    party
        .handle
        .send(HostCommand::RestoreRemoved { item_id: target })
        .await;

    let view = party.view().await;
    assert_eq!(view.state.queue.last().unwrap().id, target);
    assert!(view.recently_removed.is_empty());
}

#[tokio::test]
async fn test_settings_update_validates_ranges() {
    let party = TestParty::start();

    let result = party
        .handle
        .update_settings(PartySettings {
            max_concurrent_actions: 0,
            ..PartySettings::default()
        })
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));

    // The running settings are untouched
    let view = party.view().await;
    assert_eq!(view.settings.max_concurrent_actions, 3);
}

// ============================================================================
// Playback ticks
// ============================================================================

#[tokio::test]
async fn test_now_playing_reaches_guests() {
    let party = TestParty::start();
    party.handle.send(HostCommand::LoadDemoLibrary).await;
    party.handle.send(HostCommand::Play).await;

    let mut guest = party.join_guest("listener", 5.0).await;

    loop {
        if let PartyMessage::NowPlaying { is_playing, .. } = guest.recv().await {
            assert!(is_playing);
            break;
        }
    }
}
