//! Demo playback engine
//!
//! Simulates a playback engine against a small built-in catalog: tracks a
//! play queue, a playhead that advances in real time, and auto-advances at
//! track boundaries. Good enough to exercise the whole coordination flow
//! without a real music service.

use async_trait::async_trait;
use parking_lot::Mutex;
use party_core::{PlaybackControl, PlaybackError, PlaybackTick, TrackSummary};
use std::time::Instant;

/// The built-in catalog used by solo mode and the demo queue load
#[must_use]
pub fn demo_library() -> Vec<TrackSummary> {
    vec![
        TrackSummary::new("demo-01", "Neon Skyline", "The Wire Birds", 214),
        TrackSummary::new("demo-02", "Paper Planes at Midnight", "Ada Volt", 198),
        TrackSummary::new("demo-03", "Gravity Well", "Mono Culture", 242),
        TrackSummary::new("demo-04", "Last Train North", "Hazel & June", 187),
        TrackSummary::new("demo-05", "Glasshouse", "Foxglove Army", 225),
        TrackSummary::new("demo-06", "Static Bloom", "The Wire Birds", 203),
        TrackSummary::new("demo-07", "Copper Sun", "Ada Volt", 236),
        TrackSummary::new("demo-08", "Tidelines", "Saltwater Choir", 252),
    ]
}

#[derive(Debug)]
struct PlayerState {
    queue: Vec<String>,
    index: usize,
    /// Position at `anchored_at`, in seconds
    position: f64,
    is_playing: bool,
    anchored_at: Instant,
}

impl PlayerState {
    fn current_track_id(&self) -> Option<&String> {
        self.queue.get(self.index)
    }
}

/// In-memory playback engine
pub struct DemoPlayback {
    catalog: Vec<TrackSummary>,
    state: Mutex<PlayerState>,
}

impl DemoPlayback {
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: demo_library(),
            state: Mutex::new(PlayerState {
                queue: Vec::new(),
                index: 0,
                position: 0.0,
                is_playing: false,
                anchored_at: Instant::now(),
            }),
        }
    }

    fn duration_of(&self, track_id: &str) -> f64 {
        self.catalog
            .iter()
            .find(|t| t.track_id == track_id)
            .map_or(180.0, |t| f64::from(t.duration_seconds))
    }

    /// Advance the playhead by wall time, hopping track boundaries
    fn settle(&self, state: &mut PlayerState) {
        if !state.is_playing {
            state.anchored_at = Instant::now();
            return;
        }
        let mut position = state.position + state.anchored_at.elapsed().as_secs_f64();
        state.anchored_at = Instant::now();

        while let Some(track_id) = state.queue.get(state.index) {
            let duration = self.duration_of(track_id);
            if position < duration {
                break;
            }
            position -= duration;
            if state.index + 1 < state.queue.len() {
                state.index += 1;
            } else {
                // End of queue: stop at zero on the last track
                position = 0.0;
                state.is_playing = false;
                break;
            }
        }
        state.position = position;
    }
}

impl Default for DemoPlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybackControl for DemoPlayback {
    async fn authorize(&self) -> Result<(), PlaybackError> {
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<TrackSummary>, PlaybackError> {
        let needle = query.to_lowercase();
        Ok(self
            .catalog
            .iter()
            .filter(|t| {
                needle.is_empty()
                    || t.title.to_lowercase().contains(&needle)
                    || t.artist.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn set_queue(&self, track_ids: &[String]) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        self.settle(&mut state);

        // Keep the playhead if the playing track survived the change
        let current = state.current_track_id().cloned();
        state.queue = track_ids.to_vec();
        match current.and_then(|id| state.queue.iter().position(|t| *t == id)) {
            Some(index) => state.index = index,
            None => {
                state.index = 0;
                state.position = 0.0;
            }
        }
        Ok(())
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        if state.queue.is_empty() {
            return Err(PlaybackError::CommandFailed("queue is empty".to_string()));
        }
        self.settle(&mut state);
        state.is_playing = true;
        state.anchored_at = Instant::now();
        Ok(())
    }

    async fn pause(&self) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        self.settle(&mut state);
        state.is_playing = false;
        Ok(())
    }

    async fn skip_to_next(&self) -> Result<(), PlaybackError> {
        let mut state = self.state.lock();
        self.settle(&mut state);
        if state.index + 1 < state.queue.len() {
            state.index += 1;
            state.position = 0.0;
            state.anchored_at = Instant::now();
        } else {
            state.position = 0.0;
            state.is_playing = false;
        }
        Ok(())
    }

    async fn current_tick(&self) -> Result<PlaybackTick, PlaybackError> {
        let mut state = self.state.lock();
        self.settle(&mut state);
        Ok(PlaybackTick {
            track_id: state.current_track_id().cloned(),
            position_seconds: state.position,
            is_playing: state.is_playing,
        })
    }
}
