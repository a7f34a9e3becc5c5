//! Rate limiting
//!
//! Two independent mechanisms, composed by the voting engine:
//!
//! - Action slots: a per-member budget of concurrently "in flight" votes.
//!   A slot is taken when a vote is accepted and given back only after the
//!   cooldown window has elapsed (a deferred restore scheduled by the
//!   session controller, not an immediate release).
//! - Per-item cooldown: at most one counted vote per (member, item) per
//!   window.
//!
//! Both checks fail advisorily: callers observe the returned value and roll
//! back optimistic state themselves. Nothing here throws.

use chrono::{DateTime, Duration, Utc};
use party_core::{ItemId, MemberId};
use std::collections::HashMap;

/// Result of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Ready,
    Active {
        /// Whole seconds until the window expires, rounded up, always ≥ 1
        remaining_seconds: u64,
    },
}

impl CooldownStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Per-member action slots and per-(member, item) cooldowns
///
/// Private to the session controller; only derived projections (remaining
/// counts and seconds) ever leave the host boundary.
#[derive(Debug, Default)]
pub struct RateLimiter {
    used_slots: HashMap<MemberId, u32>,
    last_votes: HashMap<(MemberId, ItemId), DateTime<Utc>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Action slots ===

    /// Take one slot; fails closed when the member is at the limit
    pub fn try_acquire_slot(&mut self, member: &MemberId, max_concurrent: u32) -> bool {
        let used = self.used_slots.entry(member.clone()).or_insert(0);
        if *used >= max_concurrent {
            return false;
        }
        *used += 1;
        true
    }

    /// Give a slot back
    ///
    /// Safe no-op when the member holds none: a deferred restore may fire
    /// after the member's slots were already cleared.
    pub fn restore_slot(&mut self, member: &MemberId) {
        if let Some(used) = self.used_slots.get_mut(member) {
            *used = used.saturating_sub(1);
            if *used == 0 {
                self.used_slots.remove(member);
            }
        }
    }

    #[must_use]
    pub fn used_slots(&self, member: &MemberId) -> u32 {
        self.used_slots.get(member).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn remaining_slots(&self, member: &MemberId, max_concurrent: u32) -> u32 {
        max_concurrent.saturating_sub(self.used_slots(member))
    }

    // === Per-item cooldown ===

    /// Check the (member, item) cooldown without recording anything
    #[must_use]
    pub fn cooldown_status(
        &self,
        member: &MemberId,
        item: &ItemId,
        window: Duration,
        now: DateTime<Utc>,
    ) -> CooldownStatus {
        if window <= Duration::zero() {
            return CooldownStatus::Ready;
        }
        let Some(last) = self.last_votes.get(&(member.clone(), *item)) else {
            return CooldownStatus::Ready;
        };
        let elapsed = now - *last;
        if elapsed >= window {
            CooldownStatus::Ready
        } else {
            CooldownStatus::Active {
                remaining_seconds: ceil_seconds(window - elapsed),
            }
        }
    }

    /// Spend the cooldown: record the vote time when the window is clear
    pub fn spend_cooldown(
        &mut self,
        member: &MemberId,
        item: &ItemId,
        window: Duration,
        now: DateTime<Utc>,
    ) -> CooldownStatus {
        let status = self.cooldown_status(member, item, window, now);
        if status.is_ready() {
            self.last_votes.insert((member.clone(), *item), now);
        }
        status
    }

    /// Drop all cooldown records for an item (it left the queue for good;
    /// identifiers are fresh per add, so the records can never match again)
    pub fn clear_item(&mut self, item: &ItemId) {
        self.last_votes.retain(|(_, i), _| i != item);
    }

    /// Remaining cooldown seconds per item for one member, zeros omitted
    #[must_use]
    pub fn cooldowns_for(
        &self,
        member: &MemberId,
        window: Duration,
        now: DateTime<Utc>,
    ) -> HashMap<ItemId, u64> {
        if window <= Duration::zero() {
            return HashMap::new();
        }
        self.last_votes
            .iter()
            .filter(|((m, _), _)| m == member)
            .filter_map(|((_, item), last)| {
                let elapsed = now - *last;
                if elapsed >= window {
                    None
                } else {
                    Some((*item, ceil_seconds(window - elapsed)))
                }
            })
            .collect()
    }
}

/// Whole seconds, rounded up, never zero for a positive duration
fn ceil_seconds(d: Duration) -> u64 {
    let ms = d.num_milliseconds().max(0) as u64;
    ms.div_ceil(1000).max(1)
}
