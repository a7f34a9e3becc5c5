//! # party-engine
//!
//! Application layer of the party queue host: the ordered queue engine, the
//! voting and outcome engine, the rate limiter, admission control, skip
//! requests, runtime settings, and the per-member snapshot projection.
//!
//! All engines are plain single-writer state machines. They are owned by one
//! session controller task and never shared; concurrency is the controller's
//! concern, not theirs.

pub mod admission;
pub mod error;
pub mod limiter;
pub mod queue;
pub mod settings;
pub mod skip;
pub mod snapshot;
pub mod voting;

pub use admission::{AdmissionController, AdmissionKind, AdmissionRejection, JoinRequest};
pub use error::{EngineError, EngineResult};
pub use limiter::{CooldownStatus, RateLimiter};
pub use queue::QueueEngine;
pub use settings::{PartySettings, VotingMode};
pub use skip::SkipRequestEngine;
pub use snapshot::{personal_view, PersonalView};
pub use voting::{vote_threshold, OutcomeResolution, VoteRejection, VoteResult, VotingEngine};
