//! QR join payload
//!
//! The host displays `"PP|<sessionId>|<joinCode>"` as a QR code. Pipe
//! delimited, exactly three fields, first field the literal `PP`.

use party_core::{JoinCode, SessionId};
use thiserror::Error;

/// Literal prefix identifying a party join payload
const PREFIX: &str = "PP";

/// Decoded QR join payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPayload {
    pub session_id: SessionId,
    pub join_code: JoinCode,
}

/// Payload parse failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrPayloadError {
    #[error("not a party payload")]
    WrongPrefix,

    #[error("expected 3 fields, found {0}")]
    WrongFieldCount(usize),

    #[error("empty field in payload")]
    EmptyField,
}

impl JoinPayload {
    pub fn new(session_id: SessionId, join_code: JoinCode) -> Self {
        Self {
            session_id,
            join_code,
        }
    }

    /// Render the payload string for QR encoding
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{PREFIX}|{}|{}", self.session_id, self.join_code)
    }

    /// Parse a scanned payload string
    pub fn parse(raw: &str) -> Result<Self, QrPayloadError> {
        let fields: Vec<&str> = raw.split('|').collect();
        if fields.len() != 3 {
            return Err(QrPayloadError::WrongFieldCount(fields.len()));
        }
        if fields[0] != PREFIX {
            return Err(QrPayloadError::WrongPrefix);
        }
        if fields[1].is_empty() || fields[2].is_empty() {
            return Err(QrPayloadError::EmptyField);
        }
        Ok(Self {
            session_id: SessionId::new(fields[1]),
            join_code: JoinCode::new(fields[2]),
        })
    }
}
