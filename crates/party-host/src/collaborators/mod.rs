//! Reference collaborator implementations
//!
//! In-process stand-ins for the playback engine and positioning service,
//! used by solo mode and tests. Real deployments substitute their own
//! implementations of the party-core ports.

mod location;
mod playback;

pub use location::FixedLocation;
pub use playback::{demo_library, DemoPlayback};
