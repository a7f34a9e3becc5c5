//! Join code - the short admission secret the host displays

use serde::{Deserialize, Serialize};
use std::fmt;

/// Admission secret, regenerated for every hosting session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinCode(String);

impl JoinCode {
    /// Code length shown on screen and embedded in the QR payload
    pub const LEN: usize = 6;

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Generate a random join code
    ///
    /// Uppercase letters and digits only, so the code stays readable when a
    /// guest has to type it by hand.
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

        let mut rng = rand::thread_rng();
        Self(
            (0..Self::LEN)
                .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
                .collect(),
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JoinCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
