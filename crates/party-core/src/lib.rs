//! # party-core
//!
//! Domain layer containing entities, value objects, domain errors, and the
//! collaborator ports (playback, positioning) the coordination engine needs.
//! This crate has zero dependencies on infrastructure (sockets, timers, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Member, PartyState, PendingSkipRequest, PendingVoteOutcome, QueueItem, TrackSummary,
};
pub use error::{DomainError, PlaybackError};
pub use traits::{LocationAuthorization, LocationProvider, PlaybackControl, PlaybackTick};
pub use value_objects::{
    GeoPoint, ItemId, JoinCode, MemberId, OutcomeKind, OutcomeKinds, SessionId, VoteDirection,
};
