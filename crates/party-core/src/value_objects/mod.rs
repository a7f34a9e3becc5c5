//! Value objects - immutable types that represent domain concepts

mod geo;
mod ids;
mod join_code;
mod outcome;

pub use geo::GeoPoint;
pub use ids::{ItemId, MemberId, SessionId};
pub use join_code::JoinCode;
pub use outcome::{OutcomeKind, OutcomeKinds, VoteDirection};
