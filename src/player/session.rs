use std::time::Duration;

use crate::catalog::{TrackDescriptor, TrackId, WindowEnd};

/// Where the engine is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// No active track.
    #[default]
    Idle,
    /// Asset assigned and play requested, not yet confirmed by the media handle.
    Loading,
    Playing,
    Paused,
}

/// The single mutable playback session owned by the engine.
#[derive(Debug, Clone, Default)]
pub(super) struct PlaybackSession {
    pub active: Option<ActiveTrack>,
    pub state: PlayerState,
    pub elapsed_absolute: Duration,
    pub asset_duration: Option<Duration>,
}

/// The window of the loaded track, copied out of the catalog on selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) struct ActiveTrack {
    pub id: TrackId,
    pub window_start: Duration,
    pub window_end: WindowEnd,
}

impl From<&TrackDescriptor> for ActiveTrack {
    fn from(t: &TrackDescriptor) -> Self {
        Self {
            id: t.id,
            window_start: t.window_start,
            window_end: t.window_end,
        }
    }
}

impl PlaybackSession {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn active_id(&self) -> Option<TrackId> {
        self.active.map(|a| a.id)
    }
}

/// Observable playback state published to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub active_track: Option<TrackId>,
    pub state: PlayerState,
    /// Playhead in the asset's own timeline.
    pub elapsed_absolute: Duration,
    pub asset_duration: Option<Duration>,
    pub window_start: Duration,
    pub window_end: WindowEnd,
    pub volume: f32,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            active_track: None,
            state: PlayerState::Idle,
            elapsed_absolute: Duration::ZERO,
            asset_duration: None,
            window_start: Duration::ZERO,
            window_end: WindowEnd::NaturalEnd,
            volume: 1.0,
        }
    }
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn is_idle(&self) -> bool {
        self.state == PlayerState::Idle
    }

    /// Seconds since the window start. Negative after a seek before the window.
    pub fn window_relative_secs(&self) -> f64 {
        self.elapsed_absolute.as_secs_f64() - self.window_start.as_secs_f64()
    }

    /// Window-relative elapsed time for display, never below zero.
    pub fn display_elapsed(&self) -> Duration {
        self.elapsed_absolute.saturating_sub(self.window_start)
    }

    pub fn window_duration(&self) -> Option<Duration> {
        match self.window_end {
            WindowEnd::At(end) => Some(end.saturating_sub(self.window_start)),
            WindowEnd::NaturalEnd => self
                .asset_duration
                .map(|total| total.saturating_sub(self.window_start)),
        }
    }

    /// Position within the window in `0.0..=1.0`; zero when the length is unknown.
    pub fn progress_ratio(&self) -> f64 {
        match self.window_duration() {
            Some(total) if !total.is_zero() => {
                (self.display_elapsed().as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}
