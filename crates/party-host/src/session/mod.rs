//! Session controllers
//!
//! The host side is a single-owner event loop: one task owns the party
//! state and every engine, fed through a command channel. The guest side is
//! a symmetric, simpler state machine.

mod command;
mod controller;
mod guest;

pub use command::{HostCommand, HostView};
pub use controller::{SessionController, SessionHandle};
pub use guest::{GuestPhase, GuestSessionController, PlayheadView};
