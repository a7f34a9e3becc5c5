//! Runtime party settings
//!
//! Host-adjustable while the session is live. Changes take effect for future
//! checks immediately; timestamps already recorded are never rewritten.

use chrono::Duration;
use party_core::OutcomeKinds;
use validator::Validate;

use crate::error::{EngineError, EngineResult};

/// How threshold crossings are acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VotingMode {
    /// Outcomes are applied immediately
    #[default]
    Automatic,
    /// Outcomes are queued for explicit host approval
    HostApproval,
}

/// Voting and rate-limit configuration
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PartySettings {
    pub voting_mode: VotingMode,

    /// Percentage of admitted guests needed to trigger an outcome
    #[validate(range(max = 100))]
    pub threshold_percent: u8,

    /// Per-(member, item) vote cooldown window; zero disables the check
    #[validate(range(max = 120))]
    pub cooldown_minutes: u32,

    /// Per-member concurrent action slots
    #[validate(range(min = 1, max = 10))]
    pub max_concurrent_actions: u32,

    /// Per-kind outcome toggles
    pub enabled_outcomes: OutcomeKinds,
}

impl Default for PartySettings {
    fn default() -> Self {
        Self {
            voting_mode: VotingMode::Automatic,
            threshold_percent: 50,
            cooldown_minutes: 1,
            max_concurrent_actions: 3,
            enabled_outcomes: OutcomeKinds::all(),
        }
    }
}

impl PartySettings {
    /// The cooldown window as a duration
    #[must_use]
    pub fn cooldown_window(&self) -> Duration {
        Duration::minutes(i64::from(self.cooldown_minutes))
    }

    /// Delay before an acquired action slot is restored
    #[must_use]
    pub fn slot_restore_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.cooldown_minutes) * 60)
    }

    /// Validate ranges, rejecting the whole update on any violation
    pub fn checked(self) -> EngineResult<Self> {
        self.validate()
            .map_err(|e| EngineError::validation(e.to_string()))?;
        Ok(self)
    }
}
