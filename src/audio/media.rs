//! The media-output seam between the playback engine and the host decoder.
//!
//! A `MediaOutput` behaves like a single media element: it is pointed at one
//! asset at a time, accepts play/pause/seek requests and reports what
//! actually happened through `MediaEvent`s that the owner drains.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("audio output unavailable: {0}")]
    Device(String),
    #[error("cannot open asset {asset}: {reason}")]
    Open { asset: String, reason: String },
    #[error("cannot decode asset {asset}: {reason}")]
    Decode { asset: String, reason: String },
    #[error("no asset loaded")]
    NotLoaded,
    #[error("seek to {0:?} failed")]
    Seek(Duration),
}

/// Notifications produced by the media handle.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Playback has actually started (or resumed).
    Playing,
    /// Playback has been paused.
    Paused,
    /// Asset metadata is available.
    DurationChanged(Duration),
    /// The asset played to its natural end.
    Ended,
    /// Playback failed after it was requested.
    Error(MediaError),
}

pub trait MediaOutput {
    /// Point the handle at `asset_ref`, leaving it paused at zero.
    fn load(&mut self, asset_ref: &str) -> Result<(), MediaError>;

    /// Request playback. Success means the request was accepted; the
    /// `Playing` event confirms it.
    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    /// Move the playhead within the asset's own timeline.
    fn seek(&mut self, position: Duration) -> Result<(), MediaError>;

    /// Current playhead in the asset's own timeline.
    fn position(&self) -> Duration;

    /// `volume` is already clamped to `[0, 1]`.
    fn set_volume(&mut self, volume: f32);

    /// Halt and rewind to zero, releasing the decoder.
    fn unload(&mut self);

    /// Take all events produced since the last call.
    fn drain_events(&mut self) -> Vec<MediaEvent>;

    /// Lower the volume to silence over `duration` before a teardown.
    fn fade_out(&mut self, _duration: Duration) {}
}
