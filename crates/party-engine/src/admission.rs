//! Admission control
//!
//! Validates join requests (session identity, join code, proximity) and
//! manages the member lifecycle, distinguishing a reconnection from a first
//! join so the headcount never double-counts a device.

use std::fmt;
use std::time::Duration;

use party_core::{GeoPoint, JoinCode, LocationProvider, Member, MemberId, SessionId};
use tokio::time::Instant;

/// How often the host location is polled while waiting for a fix
const LOCATION_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A join request as the engine sees it (decoded off the wire by the host)
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub session_id: SessionId,
    pub join_code: JoinCode,
    pub member_id: MemberId,
    pub display_name: String,
    pub has_playback_account: bool,
    pub location: Option<GeoPoint>,
}

/// Why a join request was turned down
///
/// Terminal for the attempt; the guest may retry by rescanning.
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionRejection {
    WrongSession,
    WrongJoinCode,
    /// Neither side could supply a location fix in time
    LocationMissing,
    TooFar { distance_m: u32 },
}

impl fmt::Display for AdmissionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongSession => write!(f, "session not found"),
            Self::WrongJoinCode => write!(f, "invalid join code"),
            Self::LocationMissing => write!(f, "location missing"),
            Self::TooFar { distance_m } => write!(f, "too far away ({distance_m} m)"),
        }
    }
}

/// Whether an accepted request created a member or refreshed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionKind {
    NewMember,
    Reconnection,
}

/// Join request validator
#[derive(Debug, Clone)]
pub struct AdmissionController {
    session_id: SessionId,
    join_code: JoinCode,
    proximity_radius_m: f64,
    location_wait: Duration,
}

impl AdmissionController {
    pub fn new(
        session_id: SessionId,
        join_code: JoinCode,
        proximity_radius_m: f64,
        location_wait: Duration,
    ) -> Self {
        Self {
            session_id,
            join_code,
            proximity_radius_m,
            location_wait,
        }
    }

    /// Run the admission checks in order, returning the measured distance
    ///
    /// The host-fix wait is the only suspension point: bounded polling with
    /// sleep, failing fast when positioning authorization is denied.
    pub async fn admit(
        &self,
        location: &dyn LocationProvider,
        request: &JoinRequest,
    ) -> Result<f64, AdmissionRejection> {
        if request.session_id != self.session_id {
            return Err(AdmissionRejection::WrongSession);
        }
        if request.join_code != self.join_code {
            return Err(AdmissionRejection::WrongJoinCode);
        }

        let host_fix = self
            .await_host_fix(location)
            .await
            .ok_or(AdmissionRejection::LocationMissing)?;
        let guest_fix = request.location.ok_or(AdmissionRejection::LocationMissing)?;

        let distance_m = host_fix.distance_m(&guest_fix);
        if distance_m > self.proximity_radius_m {
            tracing::debug!(
                member_id = %request.member_id,
                distance_m = distance_m.round(),
                "Join rejected: out of range"
            );
            return Err(AdmissionRejection::TooFar {
                distance_m: distance_m.round() as u32,
            });
        }
        Ok(distance_m)
    }

    async fn await_host_fix(&self, location: &dyn LocationProvider) -> Option<GeoPoint> {
        let deadline = Instant::now() + self.location_wait;
        loop {
            if !location.authorization_status().can_provide_fix() {
                return None;
            }
            if let Some(fix) = location.current_fix().await {
                return Some(fix);
            }
            if Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(LOCATION_POLL_INTERVAL).await;
        }
    }

    /// Record an accepted request in the member list
    ///
    /// An existing entry is updated in place and marked admitted - a
    /// reconnection, not a new join.
    pub fn register(members: &mut Vec<Member>, request: &JoinRequest) -> AdmissionKind {
        if let Some(member) = members.iter_mut().find(|m| m.id == request.member_id) {
            member.touch(&request.display_name, request.has_playback_account);
            AdmissionKind::Reconnection
        } else {
            members.push(Member::new(
                request.member_id.clone(),
                &request.display_name,
                request.has_playback_account,
            ));
            AdmissionKind::NewMember
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use party_core::LocationAuthorization;
    use std::sync::Mutex;

    struct StubLocation {
        status: LocationAuthorization,
        fix: Mutex<Option<GeoPoint>>,
    }

    impl StubLocation {
        fn with_fix(fix: GeoPoint) -> Self {
            Self {
                status: LocationAuthorization::Authorized,
                fix: Mutex::new(Some(fix)),
            }
        }

        fn denied() -> Self {
            Self {
                status: LocationAuthorization::Denied,
                fix: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LocationProvider for StubLocation {
        fn authorization_status(&self) -> LocationAuthorization {
            self.status
        }

        async fn current_fix(&self) -> Option<GeoPoint> {
            *self.fix.lock().unwrap()
        }
    }

    fn controller() -> AdmissionController {
        AdmissionController::new(
            SessionId::new("sess1"),
            JoinCode::new("AB12CD"),
            65.0,
            Duration::from_millis(500),
        )
    }

    fn request(location: Option<GeoPoint>) -> JoinRequest {
        JoinRequest {
            session_id: SessionId::new("sess1"),
            join_code: JoinCode::new("AB12CD"),
            member_id: MemberId::new("device-1"),
            display_name: "Guest".to_string(),
            has_playback_account: false,
            location,
        }
    }

    #[tokio::test]
    async fn test_wrong_session_rejected_first() {
        let ctrl = controller();
        let loc = StubLocation::denied();
        let mut req = request(None);
        req.session_id = SessionId::new("other");

        // Session check fires before any location work
        let err = ctrl.admit(&loc, &req).await.unwrap_err();
        assert_eq!(err, AdmissionRejection::WrongSession);
    }

    #[tokio::test]
    async fn test_wrong_join_code() {
        let ctrl = controller();
        let loc = StubLocation::with_fix(GeoPoint::new(48.0, 16.0));
        let mut req = request(Some(GeoPoint::new(48.0, 16.0)));
        req.join_code = JoinCode::new("XXXXXX");

        let err = ctrl.admit(&loc, &req).await.unwrap_err();
        assert_eq!(err, AdmissionRejection::WrongJoinCode);
    }

    #[tokio::test]
    async fn test_denied_authorization_fails_fast() {
        let ctrl = controller();
        let loc = StubLocation::denied();

        let start = std::time::Instant::now();
        let err = ctrl
            .admit(&loc, &request(Some(GeoPoint::new(48.0, 16.0))))
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionRejection::LocationMissing);
        // No full timeout wait when authorization can never yield a fix
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_missing_guest_location() {
        let ctrl = controller();
        let loc = StubLocation::with_fix(GeoPoint::new(48.0, 16.0));

        let err = ctrl.admit(&loc, &request(None)).await.unwrap_err();
        assert_eq!(err, AdmissionRejection::LocationMissing);
    }

    #[tokio::test]
    async fn test_too_far_reports_distance() {
        let ctrl = controller();
        let host = GeoPoint::new(48.2082, 16.3738);
        let loc = StubLocation::with_fix(host);

        let err = ctrl
            .admit(&loc, &request(Some(host.offset_north_m(200.0))))
            .await
            .unwrap_err();
        match err {
            AdmissionRejection::TooFar { distance_m } => {
                assert!((195..=205).contains(&distance_m), "got {distance_m}");
            }
            other => panic!("expected TooFar, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nearby_guest_admitted() {
        let ctrl = controller();
        let host = GeoPoint::new(48.2082, 16.3738);
        let loc = StubLocation::with_fix(host);

        let distance = ctrl
            .admit(&loc, &request(Some(host.offset_north_m(10.0))))
            .await
            .unwrap();
        assert!(distance < 15.0);
    }

    #[test]
    fn test_register_distinguishes_reconnection() {
        let mut members = Vec::new();
        let req = request(None);

        assert_eq!(
            AdmissionController::register(&mut members, &req),
            AdmissionKind::NewMember
        );
        assert_eq!(members.len(), 1);

        assert_eq!(
            AdmissionController::register(&mut members, &req),
            AdmissionKind::Reconnection
        );
        assert_eq!(members.len(), 1);
    }
}
