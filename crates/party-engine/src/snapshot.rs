//! Per-member snapshot projection
//!
//! A pure projection from the private limiter state to the numbers a single
//! guest is allowed to see. The limiters themselves never cross the host
//! boundary and are untouched by serialization.

use chrono::{DateTime, Utc};
use party_core::{ItemId, MemberId};
use std::collections::HashMap;

use crate::limiter::RateLimiter;
use crate::settings::PartySettings;

/// The personalized slice of a state snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalView {
    /// Remaining cooldown seconds per item; zero entries are omitted
    pub cooldowns: HashMap<ItemId, u64>,
    pub remaining_action_slots: u32,
}

/// Project the limiter state for one member
#[must_use]
pub fn personal_view(
    limiter: &RateLimiter,
    settings: &PartySettings,
    member: &MemberId,
    now: DateTime<Utc>,
) -> PersonalView {
    PersonalView {
        cooldowns: limiter.cooldowns_for(member, settings.cooldown_window(), now),
        remaining_action_slots: limiter.remaining_slots(member, settings.max_concurrent_actions),
    }
}
