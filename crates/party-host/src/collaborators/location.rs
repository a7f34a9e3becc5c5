//! Fixed positioning provider

use async_trait::async_trait;
use party_core::{GeoPoint, LocationAuthorization, LocationProvider};

/// A positioning service pinned to one coordinate (or to none at all)
#[derive(Debug, Clone)]
pub struct FixedLocation {
    status: LocationAuthorization,
    fix: Option<GeoPoint>,
}

impl FixedLocation {
    /// Provider that always returns the given fix
    #[must_use]
    pub fn new(fix: GeoPoint) -> Self {
        Self {
            status: LocationAuthorization::Authorized,
            fix: Some(fix),
        }
    }

    /// Provider with positioning denied; admission fails fast against it
    #[must_use]
    pub fn denied() -> Self {
        Self {
            status: LocationAuthorization::Denied,
            fix: None,
        }
    }

    /// Authorized but never produces a fix (admission times out)
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            status: LocationAuthorization::Authorized,
            fix: None,
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    fn authorization_status(&self) -> LocationAuthorization {
        self.status
    }

    async fn current_fix(&self) -> Option<GeoPoint> {
        self.fix
    }
}
