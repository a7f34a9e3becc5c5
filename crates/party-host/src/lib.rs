//! # party-host
//!
//! The host side of the party queue: wire protocol, peer connection
//! management, the single-owner session controller, and the symmetric guest
//! client state machine. Also ships reference implementations of the
//! playback and positioning collaborators for solo mode and tests.

pub mod collaborators;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod session;

pub use server::{create_app, create_router, run, run_server, HostState};
pub use session::{GuestSessionController, HostCommand, HostView, SessionController, SessionHandle};
