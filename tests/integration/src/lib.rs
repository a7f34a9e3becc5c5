//! Integration test utilities for the party host
//!
//! This crate provides helpers for driving a real session controller over
//! its command channel with channel-backed peers, and for running the full
//! WebSocket server end to end.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
