//! Wire protocol
//!
//! Defines the tagged-union message envelope exchanged between host and
//! guests, and the QR-encoded join payload.

mod messages;
mod qr;

pub use messages::PartyMessage;
pub use qr::{JoinPayload, QrPayloadError};
