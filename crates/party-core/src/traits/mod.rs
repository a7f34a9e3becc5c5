//! Collaborator ports - interfaces the coordination engine needs
//!
//! The domain layer defines what it needs from the playback engine and the
//! positioning service; the host crate provides the implementations.

mod collaborators;

pub use collaborators::{
    LocationAuthorization, LocationProvider, PlaybackControl, PlaybackTick,
};
