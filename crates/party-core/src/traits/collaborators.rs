//! Playback and positioning ports

use async_trait::async_trait;

use crate::entities::TrackSummary;
use crate::error::PlaybackError;
use crate::value_objects::GeoPoint;

/// One periodic playback report
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackTick {
    /// Catalog id of the track currently loaded, if any
    pub track_id: Option<String>,
    pub position_seconds: f64,
    pub is_playing: bool,
}

impl PlaybackTick {
    /// Tick representing an idle player
    #[must_use]
    pub fn idle() -> Self {
        Self {
            track_id: None,
            position_seconds: 0.0,
            is_playing: false,
        }
    }
}

/// Port to the playback engine
///
/// The coordination core only drives transport controls and consumes ticks;
/// authorization and catalog mechanics stay behind this boundary.
#[async_trait]
pub trait PlaybackControl: Send + Sync {
    /// Ensure the engine is authorized to play
    async fn authorize(&self) -> Result<(), PlaybackError>;

    /// Search the catalog
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<TrackSummary>, PlaybackError>;

    /// Replace the play queue with the given track identifiers
    async fn set_queue(&self, track_ids: &[String]) -> Result<(), PlaybackError>;

    async fn play(&self) -> Result<(), PlaybackError>;

    async fn pause(&self) -> Result<(), PlaybackError>;

    async fn skip_to_next(&self) -> Result<(), PlaybackError>;

    /// Current track identity, position, and play state
    async fn current_tick(&self) -> Result<PlaybackTick, PlaybackError>;
}

/// Positioning authorization state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAuthorization {
    NotDetermined,
    Authorized,
    /// The user declined; admission must fail fast instead of waiting
    Denied,
    Restricted,
}

impl LocationAuthorization {
    /// Whether a fix can ever arrive under this authorization
    #[must_use]
    pub fn can_provide_fix(&self) -> bool {
        matches!(self, Self::NotDetermined | Self::Authorized)
    }
}

/// Port to the positioning service, used only by the admission decision
#[async_trait]
pub trait LocationProvider: Send + Sync {
    fn authorization_status(&self) -> LocationAuthorization;

    /// Most recent fix, if one is available
    async fn current_fix(&self) -> Option<GeoPoint>;
}
