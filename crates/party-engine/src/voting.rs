//! Voting and outcome engine
//!
//! Consumes votes against the current queue, applies the slot/cooldown
//! gates, mutates per-item vote sets, and turns threshold crossings into
//! queue-structural outcomes - applied immediately in automatic mode, or
//! parked as pending records for explicit host approval.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use party_core::{
    DomainError, ItemId, MemberId, OutcomeKind, PendingVoteOutcome, QueueItem, VoteDirection,
};
use uuid::Uuid;

use crate::limiter::{CooldownStatus, RateLimiter};
use crate::queue::QueueEngine;
use crate::settings::{PartySettings, VotingMode};

/// How many evicted items the host can still restore
pub const RECENTLY_REMOVED_CAPACITY: usize = 20;

/// Why a vote was not counted
///
/// Advisory values, not errors: the guest sees at most UI feedback
/// (remaining cooldown seconds), never a failure condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteRejection {
    ItemNotFound,
    /// Votes on the currently playing item are always ignored
    ItemNowPlaying,
    /// Next-up may be down-voted but not promoted further
    NextUpPromotion,
    NoActionSlots,
    CooldownActive { remaining_seconds: u64 },
}

/// Result of a vote attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteResult {
    /// Vote counted; the caller must schedule the deferred slot restore
    Accepted,
    Rejected(VoteRejection),
}

impl VoteResult {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// What happened after a threshold evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeResolution {
    /// Automatic mode: the outcome was applied to the queue
    Applied(OutcomeKind),
    /// Approval mode: a pending record was created
    Enqueued(OutcomeKind),
    /// Approval mode: an identical record was already waiting
    AlreadyPending(OutcomeKind),
}

/// Compute the vote threshold for a guest population
///
/// `max(1, ceil(guest_count × percent / 100))` - a session with no guests
/// still needs one vote, so nothing triggers spontaneously.
#[must_use]
pub fn vote_threshold(guest_count: usize, threshold_percent: u8) -> usize {
    let scaled = guest_count * usize::from(threshold_percent);
    scaled.div_ceil(100).max(1)
}

/// The voting state machine
#[derive(Debug, Default)]
pub struct VotingEngine {
    pending: Vec<PendingVoteOutcome>,
    recently_removed: VecDeque<QueueItem>,
}

impl VotingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt a vote
    ///
    /// Gate order matters: the action slot is acquired before the cooldown
    /// is spent, and rolled back if the cooldown rejects. On acceptance the
    /// item's vote sets are updated (a member's new decision replaces any
    /// prior footprint) and the caller schedules the deferred slot restore.
    pub fn cast_vote(
        &mut self,
        queue: &mut QueueEngine,
        limiter: &mut RateLimiter,
        settings: &PartySettings,
        member: &MemberId,
        item_id: &ItemId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> VoteResult {
        if !queue.contains(item_id) {
            return VoteResult::Rejected(VoteRejection::ItemNotFound);
        }
        if queue.is_current(item_id) {
            return VoteResult::Rejected(VoteRejection::ItemNowPlaying);
        }
        if queue.is_next_up(item_id) && direction == VoteDirection::Up {
            return VoteResult::Rejected(VoteRejection::NextUpPromotion);
        }

        if !limiter.try_acquire_slot(member, settings.max_concurrent_actions) {
            return VoteResult::Rejected(VoteRejection::NoActionSlots);
        }

        match limiter.spend_cooldown(member, item_id, settings.cooldown_window(), now) {
            CooldownStatus::Active { remaining_seconds } => {
                // The slot was taken optimistically; give it back
                limiter.restore_slot(member);
                VoteResult::Rejected(VoteRejection::CooldownActive { remaining_seconds })
            }
            CooldownStatus::Ready => {
                if let Some(item) = queue.item_mut(item_id) {
                    item.record_vote(member, direction);
                }
                VoteResult::Accepted
            }
        }
    }

    /// Evaluate thresholds for an item, without acting on the result
    ///
    /// Down is checked before up, so a simultaneous double crossing resolves
    /// to the removal. Items before the cursor only honor down-votes, as a
    /// send-to-end. Disabled outcome kinds never trigger.
    #[must_use]
    pub fn evaluate(
        &self,
        queue: &QueueEngine,
        settings: &PartySettings,
        guest_count: usize,
        item_id: &ItemId,
    ) -> Option<OutcomeKind> {
        let item = queue.item(item_id)?;
        if queue.is_current(item_id) {
            return None;
        }

        let threshold = vote_threshold(guest_count, settings.threshold_percent);
        let enabled = settings.enabled_outcomes;

        if queue.is_played(item_id) {
            if enabled.allows(OutcomeKind::SendToEnd) && item.down_count() >= threshold {
                return Some(OutcomeKind::SendToEnd);
            }
            return None;
        }

        if enabled.allows(OutcomeKind::Remove) && item.down_count() >= threshold {
            return Some(OutcomeKind::Remove);
        }
        if enabled.allows(OutcomeKind::PromoteBehindCurrent)
            && !queue.is_next_up(item_id)
            && item.up_count() >= threshold
        {
            return Some(OutcomeKind::PromoteBehindCurrent);
        }
        None
    }

    /// Evaluate and act per the configured voting mode
    pub fn resolve(
        &mut self,
        queue: &mut QueueEngine,
        limiter: &mut RateLimiter,
        settings: &PartySettings,
        guest_count: usize,
        item_id: &ItemId,
    ) -> Option<OutcomeResolution> {
        let kind = self.evaluate(queue, settings, guest_count, item_id)?;

        match settings.voting_mode {
            VotingMode::Automatic => {
                self.apply(queue, limiter, kind, item_id);
                tracing::info!(item_id = %item_id, kind = %kind, "Vote outcome applied");
                Some(OutcomeResolution::Applied(kind))
            }
            VotingMode::HostApproval => {
                if self
                    .pending
                    .iter()
                    .any(|p| &p.item_id == item_id && p.kind == kind)
                {
                    return Some(OutcomeResolution::AlreadyPending(kind));
                }
                let threshold = vote_threshold(guest_count, settings.threshold_percent);
                self.pending
                    .push(PendingVoteOutcome::new(*item_id, kind, threshold));
                tracing::info!(item_id = %item_id, kind = %kind, "Vote outcome awaiting host approval");
                Some(OutcomeResolution::Enqueued(kind))
            }
        }
    }

    /// Apply an outcome to the queue, clearing the affected item's votes
    fn apply(
        &mut self,
        queue: &mut QueueEngine,
        limiter: &mut RateLimiter,
        kind: OutcomeKind,
        item_id: &ItemId,
    ) {
        match kind {
            OutcomeKind::Remove => {
                if let Some(mut item) = queue.remove(item_id) {
                    item.clear_votes();
                    if self.recently_removed.len() == RECENTLY_REMOVED_CAPACITY {
                        self.recently_removed.pop_front();
                    }
                    self.recently_removed.push_back(item);
                }
                limiter.clear_item(item_id);
                self.drop_pending_for_item(item_id);
            }
            OutcomeKind::PromoteBehindCurrent => {
                if queue.move_behind_current(item_id).is_ok() {
                    if let Some(item) = queue.item_mut(item_id) {
                        item.clear_votes();
                    }
                }
            }
            OutcomeKind::SendToEnd => {
                if queue.move_to_end(item_id).is_ok() {
                    if let Some(item) = queue.item_mut(item_id) {
                        item.clear_votes();
                    }
                }
            }
        }
    }

    // === Pending outcomes (host-approval mode) ===

    #[must_use]
    pub fn pending(&self) -> &[PendingVoteOutcome] {
        &self.pending
    }

    /// Approve by identifier, performing the recorded mutation now
    pub fn approve_pending(
        &mut self,
        id: Uuid,
        queue: &mut QueueEngine,
        limiter: &mut RateLimiter,
    ) -> Result<PendingVoteOutcome, DomainError> {
        let idx = self
            .pending
            .iter()
            .position(|p| p.id == id)
            .ok_or(DomainError::PendingNotFound(id))?;
        let record = self.pending.remove(idx);
        // The item may have left the queue while the record waited; applying
        // against a missing item is a no-op
        self.apply(queue, limiter, record.kind, &record.item_id);
        Ok(record)
    }

    /// Reject by identifier, leaving queue and vote counts untouched
    pub fn reject_pending(&mut self, id: Uuid) -> Result<PendingVoteOutcome, DomainError> {
        let idx = self
            .pending
            .iter()
            .position(|p| p.id == id)
            .ok_or(DomainError::PendingNotFound(id))?;
        Ok(self.pending.remove(idx))
    }

    /// Drop pending records that reference an item no longer in the queue
    pub fn drop_pending_for_item(&mut self, item_id: &ItemId) {
        self.pending.retain(|p| &p.item_id != item_id);
    }

    // === Recently removed ===

    #[must_use]
    pub fn recently_removed(&self) -> impl Iterator<Item = &QueueItem> {
        self.recently_removed.iter()
    }

    /// Put an evicted item back at the end of the queue
    pub fn restore_removed(
        &mut self,
        item_id: &ItemId,
        queue: &mut QueueEngine,
    ) -> Result<(), DomainError> {
        let idx = self
            .recently_removed
            .iter()
            .position(|i| &i.id == item_id)
            .ok_or(DomainError::ItemNotFound(*item_id))?;
        let Some(item) = self.recently_removed.remove(idx) else {
            return Err(DomainError::ItemNotFound(*item_id));
        };
        queue.append(item);
        Ok(())
    }
}
